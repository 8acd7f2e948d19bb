use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::form::store::FieldValues;
use crate::submission::payload::{PayloadProjection, SubmissionPayload};
use crate::submission::transport::{Transport, TransportResponse};

/// Generic message shown for either failure kind.
pub const SUBMISSION_FAILED_MESSAGE: &str = "Failed to submit. Please try again.";

/// Identifier returned by the receiving system, used for display and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a submission attempt did not succeed. Both kinds are retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// No usable response: connection failure, timeout, or unparseable body.
    #[error("network failure: {0}")]
    Network(String),
    /// The endpoint answered but refused the data.
    #[error("submission rejected (HTTP {status}): {reason}")]
    RemoteRejection { status: u16, reason: String },
}

impl SubmissionError {
    pub fn is_network(&self) -> bool {
        matches!(self, SubmissionError::Network(_))
    }

    pub fn user_message(&self) -> &'static str {
        SUBMISSION_FAILED_MESSAGE
    }
}

/// How a 2xx response body proves the submission landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptRule {
    /// JSON object carrying the id under `key` (e.g. `{"job_id": "..."}`).
    Field(&'static str),
    /// JSON array of inserted rows; the id is `key` of the first row.
    FirstRow(&'static str),
    /// JSON object whose `status_key` must equal `expected`, id under `id_key`.
    Status {
        status_key: &'static str,
        expected: &'static str,
        id_key: &'static str,
    },
    /// Any 2xx is enough; a local id is minted for logging.
    Acknowledge,
}

impl ReceiptRule {
    fn interpret(
        &self,
        response: &TransportResponse,
    ) -> std::result::Result<SubmissionId, SubmissionError> {
        let rejected = |reason: String| SubmissionError::RemoteRejection {
            status: response.status,
            reason,
        };

        match self {
            ReceiptRule::Acknowledge => Ok(SubmissionId(Uuid::new_v4().to_string())),
            ReceiptRule::Field(key) => parse_body(response)?
                .get(*key)
                .and_then(id_string)
                .ok_or_else(|| rejected(format!("response is missing `{key}`"))),
            ReceiptRule::FirstRow(key) => parse_body(response)?
                .as_array()
                .and_then(|rows| rows.first())
                .and_then(|row| row.get(*key))
                .and_then(id_string)
                .ok_or_else(|| rejected(format!("response has no row with `{key}`"))),
            ReceiptRule::Status {
                status_key,
                expected,
                id_key,
            } => {
                let body = parse_body(response)?;
                let status = body.get(*status_key).and_then(Value::as_str);
                if status != Some(*expected) {
                    return Err(rejected(format!(
                        "`{status_key}` was {}",
                        status.unwrap_or("absent")
                    )));
                }
                body.get(*id_key)
                    .and_then(id_string)
                    .ok_or_else(|| rejected(format!("response is missing `{id_key}`")))
            }
        }
    }
}

fn parse_body(response: &TransportResponse) -> std::result::Result<Value, SubmissionError> {
    serde_json::from_str(&response.body)
        .map_err(|err| SubmissionError::Network(format!("malformed response body: {err}")))
}

fn id_string(value: &Value) -> Option<SubmissionId> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(SubmissionId(id.clone())),
        Value::Number(id) => Some(SubmissionId(id.to_string())),
        _ => None,
    }
}

/// Performs exactly one POST per submission and classifies the outcome.
pub struct SubmissionClient<T: Transport> {
    endpoint: Url,
    transport: T,
    projection: PayloadProjection,
    receipt: ReceiptRule,
}

impl<T: Transport> SubmissionClient<T> {
    pub fn new(endpoint: Url, transport: T, projection: PayloadProjection, receipt: ReceiptRule) -> Self {
        Self {
            endpoint,
            transport,
            projection,
            receipt,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Projects the current field values. Recomputed on every call.
    pub fn build_payload(&self, fields: &FieldValues) -> SubmissionPayload {
        self.projection.project(fields, Utc::now())
    }

    pub async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> std::result::Result<SubmissionId, SubmissionError> {
        info!(endpoint = %self.endpoint, fields = payload.len(), "submitting lead");

        let response = match self
            .transport
            .post_json(&self.endpoint, &payload.to_value())
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "submission did not reach endpoint");
                return Err(SubmissionError::Network(err.to_string()));
            }
        };

        if !response.is_success() {
            warn!(endpoint = %self.endpoint, status = response.status, "submission rejected");
            return Err(SubmissionError::RemoteRejection {
                status: response.status,
                reason: format!("endpoint answered HTTP {}", response.status),
            });
        }

        match self.receipt.interpret(&response) {
            Ok(id) => {
                info!(endpoint = %self.endpoint, submission_id = %id, "submission accepted");
                Ok(id)
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "submission response unusable");
                Err(err)
            }
        }
    }
}

impl<T: Transport> fmt::Debug for SubmissionClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("receipt", &self.receipt)
            .finish()
    }
}
