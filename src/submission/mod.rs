//! Webhook submission: payload projection, transport, and outcome mapping.

pub mod client;
pub mod payload;
pub mod transport;

pub use client::{ReceiptRule, SubmissionClient, SubmissionError, SubmissionId};
pub use payload::{PayloadProjection, PayloadRule, SubmissionPayload};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
