use thiserror::Error;

/// Error type that captures schema, store, and configuration failures.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Field `{key}` expects a {expected} value")]
    FieldKindMismatch { key: String, expected: &'static str },
    #[error("Field `{key}` has no slot {index}")]
    SlotOutOfRange { key: String, index: usize },
    #[error("Invalid form schema: {0}")]
    InvalidSchema(String),
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
    #[error("Invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IntakeError>;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] IntakeError),
    #[error("Invalid input: {0}")]
    Input(String),
}
