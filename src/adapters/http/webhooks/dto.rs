//! Response types for the webhook endpoints.

use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Event ids acknowledged back to FastSpring.
///
/// FastSpring reads the plain-text response body and marks every listed id
/// as processed; ids left out are redelivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookAcknowledgement {
    pub event_ids: Vec<String>,
}

impl WebhookAcknowledgement {
    pub fn new(event_ids: Vec<String>) -> Self {
        Self { event_ids }
    }

    /// One id per line.
    pub fn to_body(&self) -> String {
        self.event_ids.join("\n")
    }
}
