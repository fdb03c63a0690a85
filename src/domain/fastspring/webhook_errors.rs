//! Webhook error types for FastSpring webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::SubscriptionError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header absent while a webhook secret is configured.
    #[error("Missing signature")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Failed to parse the webhook body.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Event data is missing a required field or carries an unusable value.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// No local user is linked to the event's account.
    #[error("User not found for account {0}")]
    UserNotFound(String),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if FastSpring should redeliver this event.
    ///
    /// Advisory only: the processor logs it, but never records or
    /// acknowledges a failed event regardless of this value.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::UserNotFound(_) // account may be linked later
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// Per-event failures inside a batch never reach the client as a status;
    /// this mapping applies to request-level failures.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::ParseError(_) | WebhookError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }

            // Ignored events are acknowledged as success
            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::UserNotFound(_) | WebhookError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<SubscriptionError> for WebhookError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::UserNotFound { account_id } => WebhookError::UserNotFound(account_id),
            SubscriptionError::MalformedPayload { .. } => {
                WebhookError::MalformedPayload(err.message())
            }
            SubscriptionError::Infrastructure(msg) => WebhookError::Database(msg),
        }
    }
}

/// Converts DomainError to WebhookError for repository operations.
impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
