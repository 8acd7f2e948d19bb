#![doc(test(attr(deny(warnings))))]

//! W3 Intake drives the multi-section lead intake wizard used across the
//! W3 AI Solutions site: field storage, per-section validation, guarded
//! navigation, and a single-shot webhook submission.

pub mod cli;
pub mod config;
pub mod errors;
pub mod form;
pub mod profiles;
pub mod submission;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("W3 Intake tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
