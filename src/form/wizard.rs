//! Section navigation and submission state machine.
//!
//! The controller owns the [`FieldStore`] and the current section index. It
//! consults the [`SectionValidator`] before every forward move, never lets
//! the index leave `1..=N`, and treats submission as a distinct terminal
//! action on the last section rather than one more "advance".

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::form::schema::{FormSchema, SectionDescriptor};
use crate::form::store::FieldStore;
use crate::form::validator::SectionValidator;
use crate::submission::{SubmissionClient, SubmissionError, SubmissionId, SubmissionPayload, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    /// 1-based ordinal of the section on screen.
    pub current_section: usize,
    pub submission_status: SubmissionStatus,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_section: 1,
            submission_status: SubmissionStatus::Idle,
        }
    }
}

/// Result of an `advance` or `retreat` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    /// The current section is incomplete; the index did not change.
    Blocked { missing: Vec<String> },
    /// Already on the last section. Use submit instead.
    AtFinalSection,
    AtFirstSection,
}

/// Reasons a submit request did not produce a receipt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("please complete: {}", .missing.join(", "))]
    ValidationBlocked { missing: Vec<String> },
    #[error("submit is only available on section {last} (currently on {current})")]
    NotAtFinalSection { current: usize, last: usize },
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("no submission is in flight")]
    NotSubmitting,
    #[error(transparent)]
    Failed(#[from] SubmissionError),
}

#[derive(Debug, Clone)]
pub struct WizardController {
    store: FieldStore,
    state: WizardState,
    last_receipt: Option<SubmissionId>,
}

impl WizardController {
    pub fn new(schema: Arc<FormSchema>) -> Self {
        Self {
            store: FieldStore::new(schema),
            state: WizardState::default(),
            last_receipt: None,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        self.store.schema()
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_section(&self) -> usize {
        self.state.current_section
    }

    pub fn section_count(&self) -> usize {
        self.schema().section_count()
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.state.submission_status
    }

    pub fn current_descriptor(&self) -> &SectionDescriptor {
        &self.schema().sections()[self.state.current_section - 1]
    }

    pub fn is_final_section(&self) -> bool {
        self.state.current_section == self.section_count()
    }

    pub fn is_current_section_valid(&self) -> bool {
        SectionValidator::new(self.schema())
            .is_section_valid(self.state.current_section, self.store.all_fields())
    }

    pub fn missing_fields(&self) -> Vec<String> {
        SectionValidator::new(self.schema())
            .missing_fields(self.state.current_section, self.store.all_fields())
    }

    /// Id returned by the most recent successful submission.
    pub fn last_receipt(&self) -> Option<&SubmissionId> {
        self.last_receipt.as_ref()
    }

    pub fn advance(&mut self) -> Navigation {
        let current = self.state.current_section;
        if !self.is_current_section_valid() {
            let missing = self.missing_fields();
            debug!(section = current, ?missing, "advance blocked");
            return Navigation::Blocked { missing };
        }
        if self.is_final_section() {
            return Navigation::AtFinalSection;
        }
        self.state.current_section = current + 1;
        debug!(from = current, to = current + 1, "advanced");
        Navigation::Moved {
            from: current,
            to: current + 1,
        }
    }

    /// Steps back one section. Never validates.
    pub fn retreat(&mut self) -> Navigation {
        let current = self.state.current_section;
        if current <= 1 {
            return Navigation::AtFirstSection;
        }
        self.state.current_section = current - 1;
        debug!(from = current, to = current - 1, "retreated");
        Navigation::Moved {
            from: current,
            to: current - 1,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.is_final_section()
            && self.state.submission_status != SubmissionStatus::Submitting
            && self.is_current_section_valid()
    }

    /// Checks the submit gate, marks the wizard as submitting, and returns a
    /// freshly projected payload.
    ///
    /// Navigation stays available until [`finish_submission`] is called.
    ///
    /// [`finish_submission`]: WizardController::finish_submission
    pub fn begin_submission<T: Transport>(
        &mut self,
        client: &SubmissionClient<T>,
    ) -> Result<SubmissionPayload, SubmitError> {
        if self.state.submission_status == SubmissionStatus::Submitting {
            return Err(SubmitError::AlreadySubmitting);
        }
        let last = self.section_count();
        if self.state.current_section != last {
            return Err(SubmitError::NotAtFinalSection {
                current: self.state.current_section,
                last,
            });
        }
        let validator = SectionValidator::new(self.schema());
        if !validator.is_section_valid(last, self.store.all_fields()) {
            return Err(SubmitError::ValidationBlocked {
                missing: validator.missing_fields(last, self.store.all_fields()),
            });
        }

        let payload = client.build_payload(self.store.all_fields());
        self.state.submission_status = SubmissionStatus::Submitting;
        info!(form = self.schema().name(), "submission started");
        Ok(payload)
    }

    /// Applies the outcome of a submission started by `begin_submission`.
    ///
    /// Success resets every field and returns to section 1. Failure leaves
    /// the fields and section untouched so the user can retry.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionId, SubmissionError>,
    ) -> Result<SubmissionId, SubmitError> {
        if self.state.submission_status != SubmissionStatus::Submitting {
            warn!(form = self.schema().name(), "submission outcome without a pending submission");
            return Err(SubmitError::NotSubmitting);
        }
        match outcome {
            Ok(id) => {
                self.store.reset();
                self.state = WizardState {
                    current_section: 1,
                    submission_status: SubmissionStatus::Succeeded,
                };
                self.last_receipt = Some(id.clone());
                info!(form = self.schema().name(), submission_id = %id, "submission succeeded");
                Ok(id)
            }
            Err(err) => {
                self.state.submission_status = SubmissionStatus::Failed;
                warn!(form = self.schema().name(), error = %err, "submission failed");
                Err(SubmitError::Failed(err))
            }
        }
    }

    /// Gate, single POST, and outcome handling in one call.
    pub async fn submit<T: Transport>(
        &mut self,
        client: &SubmissionClient<T>,
    ) -> Result<SubmissionId, SubmitError> {
        let payload = self.begin_submission(client)?;
        let outcome = client.submit(&payload).await;
        self.finish_submission(outcome)
    }

    /// Discards every answer and returns to the first section.
    pub fn abandon(&mut self) {
        self.store.reset();
        self.state = WizardState::default();
        debug!(form = self.schema().name(), "wizard abandoned");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;
    use url::Url;

    use super::*;
    use crate::form::schema::{ChoiceOption, FieldDescriptor, Rule};
    use crate::submission::{
        PayloadProjection, PayloadRule, ReceiptRule, TransportError, TransportResponse,
    };

    const INDUSTRIES: &[ChoiceOption] = &[
        ChoiceOption::new("Healthcare", "Healthcare"),
        ChoiceOption::new("Legal", "Legal"),
    ];

    fn schema() -> Arc<FormSchema> {
        Arc::new(
            FormSchema::new(
                "wizard-test",
                vec![
                    FieldDescriptor::text("companyName", "Company Name"),
                    FieldDescriptor::choice("industry", "Industry", INDUSTRIES),
                    FieldDescriptor::text("services", "Main Services/Products"),
                    FieldDescriptor::text("targetCustomers", "Target Customers"),
                    FieldDescriptor::text("email", "Email"),
                ],
                vec![
                    SectionDescriptor::new("Core Identity", &["companyName", "industry", "services"])
                        .rule(Rule::Required("companyName"))
                        .rule(Rule::Selected("industry"))
                        .rule(Rule::Required("services")),
                    SectionDescriptor::new("Target Market", &["targetCustomers"])
                        .rule(Rule::Required("targetCustomers")),
                    SectionDescriptor::new("Contact", &["email"]).rule(Rule::Required("email")),
                ],
            )
            .unwrap(),
        )
    }

    struct Scripted {
        responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        calls: Mutex<usize>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<TransportResponse, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn post_json(
            &self,
            _url: &Url,
            _body: &Value,
        ) -> Result<TransportResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::Timeout))
        }
    }

    fn client(responses: Vec<Result<TransportResponse, TransportError>>) -> SubmissionClient<Scripted> {
        SubmissionClient::new(
            Url::parse("http://localhost:8000/api/research/start").unwrap(),
            Scripted::new(responses),
            PayloadProjection::new(vec![PayloadRule::copy("companyName", "name")]),
            ReceiptRule::Field("job_id"),
        )
    }

    fn fill_section_one(wizard: &mut WizardController) {
        let store = wizard.store_mut();
        store.set_text("companyName", "Acme").unwrap();
        store.set_text("industry", "Healthcare").unwrap();
        store.set_text("services", "widgets").unwrap();
    }

    fn walk_to_final(wizard: &mut WizardController) {
        fill_section_one(wizard);
        wizard
            .store_mut()
            .set_text("targetCustomers", "Clinics")
            .unwrap();
        wizard.store_mut().set_text("email", "ops@acme.test").unwrap();
        assert!(matches!(wizard.advance(), Navigation::Moved { to: 2, .. }));
        assert!(matches!(wizard.advance(), Navigation::Moved { to: 3, .. }));
    }

    #[test]
    fn starts_on_first_section_idle() {
        let wizard = WizardController::new(schema());
        assert_eq!(wizard.state(), WizardState::default());
        assert_eq!(wizard.current_descriptor().label, "Core Identity");
    }

    #[test]
    fn advance_is_blocked_by_missing_industry() {
        let mut wizard = WizardController::new(schema());
        wizard.store_mut().set_text("companyName", "Acme").unwrap();
        wizard.store_mut().set_text("services", "widgets").unwrap();

        assert_eq!(
            wizard.advance(),
            Navigation::Blocked {
                missing: vec!["Industry".into()]
            }
        );
        assert_eq!(wizard.current_section(), 1);

        wizard.store_mut().set_text("industry", "Healthcare").unwrap();
        assert_eq!(wizard.advance(), Navigation::Moved { from: 1, to: 2 });
    }

    #[test]
    fn retreat_needs_no_validation_and_stops_at_one() {
        let mut wizard = WizardController::new(schema());
        assert_eq!(wizard.retreat(), Navigation::AtFirstSection);

        fill_section_one(&mut wizard);
        wizard.advance();
        wizard.store_mut().set_text("companyName", "").unwrap();
        assert_eq!(wizard.retreat(), Navigation::Moved { from: 2, to: 1 });
        assert_eq!(wizard.retreat(), Navigation::AtFirstSection);
        assert_eq!(wizard.current_section(), 1);
    }

    #[test]
    fn advance_never_passes_the_last_section() {
        let mut wizard = WizardController::new(schema());
        walk_to_final(&mut wizard);
        assert_eq!(wizard.advance(), Navigation::AtFinalSection);
        assert_eq!(wizard.current_section(), 3);
    }

    #[test]
    fn submit_requires_final_section() {
        let mut wizard = WizardController::new(schema());
        fill_section_one(&mut wizard);
        let client = client(Vec::new());
        assert_eq!(
            wizard.begin_submission(&client).unwrap_err(),
            SubmitError::NotAtFinalSection {
                current: 1,
                last: 3
            }
        );
        assert_eq!(wizard.submission_status(), SubmissionStatus::Idle);
    }

    #[test]
    fn second_submission_is_refused_while_in_flight() {
        let mut wizard = WizardController::new(schema());
        walk_to_final(&mut wizard);
        let client = client(Vec::new());

        let payload = wizard.begin_submission(&client).unwrap();
        assert_eq!(payload.get("name"), Some(&Value::from("Acme")));
        assert_eq!(wizard.submission_status(), SubmissionStatus::Submitting);
        assert!(!wizard.can_submit());
        assert_eq!(
            wizard.begin_submission(&client).unwrap_err(),
            SubmitError::AlreadySubmitting
        );

        // Navigation keeps working while the request is pending.
        assert_eq!(wizard.retreat(), Navigation::Moved { from: 3, to: 2 });
    }

    #[test]
    fn outcome_without_pending_submission_is_refused() {
        let mut wizard = WizardController::new(schema());
        walk_to_final(&mut wizard);

        let outcome = Ok(SubmissionId("stray".into()));
        assert_eq!(
            wizard.finish_submission(outcome).unwrap_err(),
            SubmitError::NotSubmitting
        );
        assert_eq!(wizard.submission_status(), SubmissionStatus::Idle);
        assert_eq!(wizard.current_section(), 3);
        assert_eq!(wizard.store().text("companyName"), "Acme");
        assert!(wizard.last_receipt().is_none());

        let client = client(Vec::new());
        wizard.begin_submission(&client).unwrap();
        let id = wizard
            .finish_submission(Ok(SubmissionId("job-1".into())))
            .unwrap();
        assert_eq!(id.as_str(), "job-1");
        assert_eq!(
            wizard
                .finish_submission(Ok(SubmissionId("job-2".into())))
                .unwrap_err(),
            SubmitError::NotSubmitting
        );
    }

    #[tokio::test]
    async fn successful_submission_resets_everything() {
        let mut wizard = WizardController::new(schema());
        walk_to_final(&mut wizard);
        let client = client(vec![Ok(TransportResponse::new(200, r#"{"job_id":"abc123"}"#))]);

        let id = wizard.submit(&client).await.unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(wizard.submission_status(), SubmissionStatus::Succeeded);
        assert_eq!(wizard.current_section(), 1);
        assert!(wizard.store().is_pristine());
        assert_eq!(wizard.last_receipt(), Some(&id));
    }

    #[tokio::test]
    async fn failed_submission_keeps_answers_for_retry() {
        let mut wizard = WizardController::new(schema());
        walk_to_final(&mut wizard);
        let client = client(vec![
            Ok(TransportResponse::new(500, "oops")),
            Ok(TransportResponse::new(201, r#"{"job_id":"retry-1"}"#)),
        ]);
        let before = wizard.store().all_fields().clone();

        let err = wizard.submit(&client).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Failed(SubmissionError::RemoteRejection { status: 500, .. })
        ));
        assert_eq!(wizard.submission_status(), SubmissionStatus::Failed);
        assert_eq!(wizard.current_section(), 3);
        assert_eq!(wizard.store().all_fields(), &before);

        let id = wizard.submit(&client).await.unwrap();
        assert_eq!(id.as_str(), "retry-1");
        assert_eq!(*client.transport().calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn invalid_final_section_never_reaches_the_network() {
        let mut wizard = WizardController::new(schema());
        walk_to_final(&mut wizard);
        wizard.store_mut().set_text("email", " ").unwrap();
        let client = client(Vec::new());

        let err = wizard.submit(&client).await.unwrap_err();
        assert_eq!(
            err,
            SubmitError::ValidationBlocked {
                missing: vec!["Email".into()]
            }
        );
        assert_eq!(*client.transport().calls.lock().unwrap(), 0);
        assert_eq!(wizard.submission_status(), SubmissionStatus::Idle);
    }

    #[test]
    fn abandon_clears_answers() {
        let mut wizard = WizardController::new(schema());
        fill_section_one(&mut wizard);
        wizard.advance();
        wizard.abandon();
        assert_eq!(wizard.state(), WizardState::default());
        assert!(wizard.store().is_pristine());
    }
}
