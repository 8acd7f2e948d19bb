//! Brand discovery form inserted straight into the Supabase `companies` table.
//!
//! Point the endpoint at `<project>/rest/v1/companies` and configure the
//! `apikey` and `Authorization` headers; PostgREST answers with the inserted
//! rows because of the `Prefer` header below.

use crate::errors::Result;
use crate::form::schema::{
    ChoiceOption, FieldDescriptor, FieldKind, FormSchema, Rule, SectionDescriptor,
};
use crate::submission::{PayloadProjection, PayloadRule, ReceiptRule};

use super::Profile;

pub const NAME: &str = "discovery";
pub const SUMMARY: &str = "Brand discovery form (Supabase insert, returns the company row id)";

const ARCHETYPES: &[ChoiceOption] = &[
    ChoiceOption::new("The Sage", "The Sage (Expert, Thoughtful)"),
    ChoiceOption::new("The Hero", "The Hero (Empowering, Bold)"),
    ChoiceOption::new("The Outlaw", "The Outlaw (Rebellious, Disruptive)"),
    ChoiceOption::new("The Magician", "The Magician (Transformative, Visionary)"),
];

const PERSONAS: &[ChoiceOption] = &[
    ChoiceOption::new("Support Specialist", "Support Specialist (Safe, Patient, Helpful)"),
    ChoiceOption::new("High-Energy Closer", "High-Energy Closer (Bold, Direct, Confident)"),
];

const PLAIN_FIELDS: &[&str] = &[
    "company_name",
    "website_url",
    "primary_usp",
    "dream_outcome",
    "brand_archetype",
    "voice_persona",
    "bridge_question",
    "competitor_1_name",
    "competitor_1_website",
    "competitor_2_name",
    "competitor_2_website",
    "competitor_3_name",
    "competitor_3_website",
    "competitor_friction",
    "technical_constraints",
    "contact_name",
    "contact_email",
    "contact_phone",
];

pub fn profile() -> Result<Profile> {
    let fields = vec![
        FieldDescriptor::text("company_name", "Company Name"),
        FieldDescriptor::text("website_url", "Website URL"),
        FieldDescriptor::text("primary_usp", "Primary USP")
            .with_help("What is the ONE thing you do that your top 3 competitors cannot claim?"),
        FieldDescriptor::text("dream_outcome", "Dream Outcome")
            .with_help("In one sentence, what transformation does your customer experience?"),
        FieldDescriptor::choice("brand_archetype", "Brand Archetype", ARCHETYPES),
        FieldDescriptor::new(
            "proof_assets",
            "Proof Assets (links to case studies/reviews)",
            FieldKind::List { slots: 3 },
        ),
        FieldDescriptor::choice("voice_persona", "Voice Persona", PERSONAS),
        FieldDescriptor::text("forbidden_phrases", "Forbidden Phrases")
            .with_help("Terms your agent should NEVER mention, comma-separated"),
        FieldDescriptor::text("bridge_question", "Bridge Question")
            .with_help("What ONE question should the agent ask to qualify a lead?"),
        FieldDescriptor::text("competitor_1_name", "Competitor 1 name"),
        FieldDescriptor::text("competitor_1_website", "Competitor 1 website"),
        FieldDescriptor::text("competitor_2_name", "Competitor 2 name"),
        FieldDescriptor::text("competitor_2_website", "Competitor 2 website"),
        FieldDescriptor::text("competitor_3_name", "Competitor 3 name"),
        FieldDescriptor::text("competitor_3_website", "Competitor 3 website"),
        FieldDescriptor::text("competitor_friction", "Competitor Friction")
            .with_help("What is the #1 complaint people have about your competitors?"),
        FieldDescriptor::text("technical_constraints", "Technical Constraints"),
        FieldDescriptor::text("contact_name", "Contact Name"),
        FieldDescriptor::text("contact_email", "Contact Email"),
        FieldDescriptor::text("contact_phone", "Phone (optional)"),
    ];

    let sections = vec![
        SectionDescriptor::new(
            "Core Identity",
            &[
                "company_name",
                "website_url",
                "primary_usp",
                "dream_outcome",
                "brand_archetype",
                "proof_assets",
            ],
        )
        .rule(Rule::Required("company_name"))
        .rule(Rule::Required("primary_usp"))
        .rule(Rule::Required("dream_outcome"))
        .rule(Rule::Selected("brand_archetype")),
        SectionDescriptor::new(
            "Voice & Personality",
            &["voice_persona", "forbidden_phrases", "bridge_question"],
        )
        .rule(Rule::Selected("voice_persona"))
        .rule(Rule::Required("bridge_question")),
        SectionDescriptor::new(
            "Competitive Landscape",
            &[
                "competitor_1_name",
                "competitor_1_website",
                "competitor_2_name",
                "competitor_2_website",
                "competitor_3_name",
                "competitor_3_website",
                "competitor_friction",
            ],
        )
        .rule(Rule::AnyOf(vec!["competitor_1_name", "competitor_1_website"]))
        .rule(Rule::Required("competitor_friction")),
        SectionDescriptor::new(
            "Contact Info",
            &[
                "technical_constraints",
                "contact_name",
                "contact_email",
                "contact_phone",
            ],
        )
        .rule(Rule::Required("contact_name"))
        .rule(Rule::Required("contact_email")),
    ];

    let mut rules: Vec<PayloadRule> = PLAIN_FIELDS.iter().copied().map(PayloadRule::same).collect();
    rules.push(PayloadRule::FilterList {
        from: "proof_assets",
        to: "proof_assets",
    });
    rules.push(PayloadRule::Split {
        from: "forbidden_phrases",
        to: "forbidden_phrases",
        separator: ',',
    });

    Ok(Profile {
        name: NAME,
        summary: SUMMARY,
        schema: FormSchema::new(NAME, fields, sections)?.into(),
        projection: PayloadProjection::new(rules),
        receipt: ReceiptRule::FirstRow("id"),
        default_endpoint: None,
        default_headers: vec![("Prefer", "return=representation")],
    })
}
