//! Four-step research intake posted to the Python research backend.

use crate::errors::Result;
use crate::form::schema::{
    ChoiceOption, FieldDescriptor, FieldKind, FormSchema, Rule, SectionDescriptor,
};
use crate::submission::{PayloadProjection, PayloadRule, ReceiptRule};

use super::Profile;

pub const NAME: &str = "research";
pub const SUMMARY: &str = "Deep research discovery form (Python backend, returns a job id)";

const INDUSTRIES: &[ChoiceOption] = &[
    ChoiceOption::new("Healthcare", "Healthcare"),
    ChoiceOption::new("Real Estate", "Real Estate"),
    ChoiceOption::new("Legal", "Legal"),
    ChoiceOption::new("Finance", "Finance"),
    ChoiceOption::new("E-commerce", "E-commerce"),
    ChoiceOption::new("SaaS", "SaaS / Technology"),
    ChoiceOption::new("Restaurant", "Restaurant / Food"),
    ChoiceOption::new("Home Services", "Home Services"),
    ChoiceOption::new("Education", "Education"),
    ChoiceOption::new("Other", "Other"),
];

const AI_SERVICES: &[ChoiceOption] = &[
    ChoiceOption::new("voice-agent", "AI Voice Agent - 24/7 receptionist ($5K-15K)"),
    ChoiceOption::new("text-chatbot", "Text Chatbot - social media automation ($3K-8K)"),
    ChoiceOption::new("avatar-chatbot", "Avatar Chatbot - premium video avatar ($5K-12K)"),
];

const TIMELINES: &[ChoiceOption] = &[
    ChoiceOption::new("asap", "ASAP (within 2 weeks)"),
    ChoiceOption::new("month", "This month"),
    ChoiceOption::new("quarter", "This quarter"),
    ChoiceOption::new("exploring", "Just exploring"),
];

const BUDGETS: &[ChoiceOption] = &[
    ChoiceOption::new("5-10k", "$5,000 - $10,000"),
    ChoiceOption::new("10-20k", "$10,000 - $20,000"),
    ChoiceOption::new("20k+", "$20,000+"),
];

pub fn profile() -> Result<Profile> {
    let fields = vec![
        FieldDescriptor::text("companyName", "Company Name"),
        FieldDescriptor::choice("industry", "Industry", INDUSTRIES),
        FieldDescriptor::text("website", "Website"),
        FieldDescriptor::text("services", "Main Services/Products")
            .with_help("What do you offer? e.g. dental implants, teeth whitening, general dentistry"),
        FieldDescriptor::text("usp", "Unique Selling Proposition"),
        FieldDescriptor::text("targetCustomers", "Target Customers")
            .with_help("Describe your ideal customer, e.g. small business owners aged 35-55 in Dallas"),
        FieldDescriptor::text("challenges", "Biggest Challenges"),
        FieldDescriptor::text("dreamOutcome", "Dream Outcome"),
        FieldDescriptor::text("competitor1", "Competitor 1"),
        FieldDescriptor::text("competitor2", "Competitor 2"),
        FieldDescriptor::text("competitor3", "Competitor 3"),
        FieldDescriptor::text("differentiator", "What makes you better?"),
        FieldDescriptor::new(
            "aiServices",
            "Which AI services interest you?",
            FieldKind::MultiSelect(AI_SERVICES.to_vec()),
        ),
        FieldDescriptor::text("email", "Email"),
        FieldDescriptor::text("phone", "Phone"),
        FieldDescriptor::choice("timeline", "Timeline", TIMELINES),
        FieldDescriptor::choice("budget", "Budget Range", BUDGETS),
    ];

    let sections = vec![
        SectionDescriptor::new(
            "Core Identity",
            &["companyName", "industry", "website", "services", "usp"],
        )
        .rule(Rule::Required("companyName"))
        .rule(Rule::Selected("industry"))
        .rule(Rule::Required("services")),
        SectionDescriptor::new("Target Market", &["targetCustomers", "challenges", "dreamOutcome"])
            .rule(Rule::Required("targetCustomers")),
        SectionDescriptor::new(
            "Competition",
            &["competitor1", "competitor2", "competitor3", "differentiator"],
        )
        .rule(Rule::AnyOf(vec!["competitor1", "competitor2", "competitor3"])),
        SectionDescriptor::new(
            "AI Services",
            &["aiServices", "email", "phone", "timeline", "budget"],
        )
        .rule(Rule::NonEmptyList("aiServices"))
        .rule(Rule::Required("email")),
    ];

    let projection = PayloadProjection::new(vec![
        PayloadRule::copy("companyName", "name"),
        PayloadRule::same("industry"),
        PayloadRule::same("website"),
        PayloadRule::same("services"),
        PayloadRule::copy("targetCustomers", "target_customers"),
        PayloadRule::same("usp"),
        PayloadRule::Collect {
            from: vec!["competitor1", "competitor2", "competitor3"],
            to: "competitors",
        },
        PayloadRule::same("challenges"),
        PayloadRule::same("email"),
        PayloadRule::same("phone"),
        PayloadRule::copy("dreamOutcome", "dream_outcome"),
        PayloadRule::same("differentiator"),
        PayloadRule::copy("aiServices", "ai_services"),
        PayloadRule::same("timeline"),
        PayloadRule::same("budget"),
    ]);

    Ok(Profile {
        name: NAME,
        summary: SUMMARY,
        schema: FormSchema::new(NAME, fields, sections)?.into(),
        projection,
        receipt: ReceiptRule::Field("job_id"),
        default_endpoint: Some("http://localhost:8000/api/research/start"),
        default_headers: Vec::new(),
    })
}
