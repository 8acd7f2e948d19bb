//! Built-in deployment profiles.
//!
//! Each profile bundles one form schema with the payload projection,
//! receipt rule, and endpoint defaults of the system that receives it.
//! The wizard, validator, and client are shared; only this data differs.

pub mod discovery;
pub mod instant_demo;
pub mod research;
pub mod speed_to_lead;

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::errors::{IntakeError, Result};
use crate::form::schema::FormSchema;
use crate::form::wizard::WizardController;
use crate::submission::{PayloadProjection, ReceiptRule, SubmissionClient, Transport};

/// Names and one-line summaries of every built-in profile, in display order.
pub const PROFILES: &[(&str, &str)] = &[
    (research::NAME, research::SUMMARY),
    (discovery::NAME, discovery::SUMMARY),
    (speed_to_lead::NAME, speed_to_lead::SUMMARY),
    (instant_demo::NAME, instant_demo::SUMMARY),
];

pub const DEFAULT_PROFILE: &str = research::NAME;

const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Clone)]
pub struct Profile {
    pub name: &'static str,
    pub summary: &'static str,
    pub schema: Arc<FormSchema>,
    pub projection: PayloadProjection,
    pub receipt: ReceiptRule,
    /// Used when neither the config file nor the environment sets one.
    pub default_endpoint: Option<&'static str>,
    /// Headers the receiver always needs, merged under configured headers.
    pub default_headers: Vec<(&'static str, &'static str)>,
}

impl Profile {
    /// Fresh wizard on section 1 with every field empty.
    pub fn wizard(&self) -> WizardController {
        WizardController::new(Arc::clone(&self.schema))
    }

    pub fn client<T: Transport>(&self, endpoint: Url, transport: T) -> SubmissionClient<T> {
        SubmissionClient::new(
            endpoint,
            transport,
            self.projection.clone(),
            self.receipt.clone(),
        )
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("sections", &self.schema.section_count())
            .field("receipt", &self.receipt)
            .field("default_endpoint", &self.default_endpoint)
            .finish()
    }
}

/// Looks up a built-in profile by name (case-insensitive, `_` or `-`).
pub fn find(name: &str) -> Result<Profile> {
    let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
    match normalized.as_str() {
        research::NAME => research::profile(),
        discovery::NAME => discovery::profile(),
        speed_to_lead::NAME => speed_to_lead::profile(),
        instant_demo::NAME => instant_demo::profile(),
        _ => Err(IntakeError::UnknownProfile(match suggest(&normalized) {
            Some(candidate) => format!("{name} (did you mean `{candidate}`?)"),
            None => name.to_string(),
        })),
    }
}

/// Closest built-in profile name, if any is similar enough.
pub fn suggest(name: &str) -> Option<&'static str> {
    PROFILES
        .iter()
        .map(|(candidate, _)| (*candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
