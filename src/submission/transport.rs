use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::errors::{IntakeError, Result};

/// Default per-request timeout for webhook submissions.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Raw HTTP outcome handed back to the submission client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that prevented any HTTP response from arriving.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request failed: {0}")]
    Request(String),
}

/// Sends one JSON POST. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &Url,
        body: &Value,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a dedicated `reqwest::Client`.
///
/// Built explicitly by whoever owns the wizard and dropped with it; there is
/// no process-wide client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    headers: BTreeMap<String, String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| IntakeError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            headers: BTreeMap::new(),
        })
    }

    /// Adds a header sent with every request (e.g. Supabase `apikey`).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.into());
        }
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &Url,
        body: &Value,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut request = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(body);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        debug!(%url, status, "webhook responded");
        Ok(TransportResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}
