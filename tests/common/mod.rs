#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;
use tempfile::TempDir;
use url::Url;
use w3_intake::{
    form::{FieldValue, WizardController},
    submission::{Transport, TransportError, TransportResponse},
};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Transport that replays canned responses and records every request body.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<(Url, Value)>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Url, Value)> {
        self.requests.lock().expect("lock requests").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, url: &Url, body: &Value) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .expect("lock requests")
            .push((url.clone(), body.clone()));
        self.responses
            .lock()
            .expect("lock responses")
            .pop_front()
            .unwrap_or(Err(TransportError::Timeout))
    }
}

pub fn ok(body: &str) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(200, body))
}

pub fn fill_core_identity(wizard: &mut WizardController) {
    let store = wizard.store_mut();
    store.set_text("companyName", "Acme Dental").expect("company name");
    store
        .set_field("industry", FieldValue::choice("Healthcare"))
        .expect("industry");
    store.set_text("services", "Implants").expect("services");
}

pub fn fill_target_market(wizard: &mut WizardController) {
    wizard
        .store_mut()
        .set_text("targetCustomers", "Adults 35-55")
        .expect("target customers");
}

pub fn fill_competition(wizard: &mut WizardController) {
    wizard
        .store_mut()
        .set_text("competitor2", "Bright Smiles")
        .expect("competitor");
}

pub fn fill_ai_services(wizard: &mut WizardController) {
    let store = wizard.store_mut();
    store.toggle_item("aiServices", "voice-agent").expect("ai services");
    store.set_text("email", "owner@acme.test").expect("email");
}

/// Fills every required field and walks to the final section.
pub fn complete_research(wizard: &mut WizardController) {
    fill_core_identity(wizard);
    wizard.advance();
    fill_target_market(wizard);
    wizard.advance();
    fill_competition(wizard);
    wizard.advance();
    fill_ai_services(wizard);
    assert!(wizard.is_final_section());
}
