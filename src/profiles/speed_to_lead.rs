//! One-field callback request that triggers an outbound call through n8n.

use serde_json::json;

use crate::errors::Result;
use crate::form::schema::{FieldDescriptor, FormSchema, Rule, SectionDescriptor};
use crate::submission::{PayloadProjection, PayloadRule, ReceiptRule};

use super::Profile;

pub const NAME: &str = "speed-to-lead";
pub const SUMMARY: &str = "Instant callback request (n8n webhook, acknowledged without an id)";

const SOURCE_TAG: &str = "w3-website-speed-to-lead";
const MIN_PHONE_LENGTH: usize = 10;

pub fn profile() -> Result<Profile> {
    let fields = vec![FieldDescriptor::text("phone", "Phone Number")
        .with_help("We'll call you within seconds. Include the area code.")];

    let sections = vec![SectionDescriptor::new("Call Me Now", &["phone"])
        .rule(Rule::MinLength("phone", MIN_PHONE_LENGTH))];

    let projection = PayloadProjection::new(vec![
        PayloadRule::same("phone"),
        PayloadRule::Constant {
            to: "source",
            value: json!(SOURCE_TAG),
        },
        PayloadRule::Timestamp { to: "timestamp" },
    ]);

    Ok(Profile {
        name: NAME,
        summary: SUMMARY,
        schema: FormSchema::new(NAME, fields, sections)?.into(),
        projection,
        receipt: ReceiptRule::Acknowledge,
        default_endpoint: None,
        default_headers: Vec::new(),
    })
}
