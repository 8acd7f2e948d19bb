//! Website-to-voice-demo builder. The webhook answers in-band with a status.

use crate::errors::Result;
use crate::form::schema::{FieldDescriptor, FormSchema, Rule, SectionDescriptor};
use crate::submission::{PayloadProjection, PayloadRule, ReceiptRule};

use super::Profile;

pub const NAME: &str = "instant-demo";
pub const SUMMARY: &str = "Build a voice demo from a website URL (n8n, returns an assistant id)";

pub fn profile() -> Result<Profile> {
    let fields = vec![FieldDescriptor::text("website", "Business Website")
        .with_help("e.g. your-business.com; https:// is added when missing")];

    let sections =
        vec![SectionDescriptor::new("Build My Demo", &["website"]).rule(Rule::Required("website"))];

    let projection = PayloadProjection::new(vec![PayloadRule::NormalizeUrl {
        from: "website",
        to: "url",
    }]);

    Ok(Profile {
        name: NAME,
        summary: SUMMARY,
        schema: FormSchema::new(NAME, fields, sections)?.into(),
        projection,
        receipt: ReceiptRule::Status {
            status_key: "status",
            expected: "success",
            id_key: "assistant_id",
        },
        default_endpoint: Some("https://n8n.w3aisolutions.org/webhook/instant-demo-v2"),
        default_headers: Vec::new(),
    })
}
