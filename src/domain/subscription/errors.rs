//! Subscription-specific error types.
//!
//! # Webhook Mapping
//!
//! | Error | Retryable |
//! |-------|-----------|
//! | UserNotFound | yes (account may be linked later) |
//! | MalformedPayload | no |
//! | Infrastructure | yes |

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised while reconciling a provider event into local records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// No local user is linked to the FastSpring account.
    UserNotFound { account_id: String },

    /// The event payload is missing a field or carries an unusable value.
    MalformedPayload { field: String, message: String },

    /// Storage failure.
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn user_not_found(account_id: impl Into<String>) -> Self {
        SubscriptionError::UserNotFound {
            account_id: account_id.into(),
        }
    }

    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::MalformedPayload {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::UserNotFound { .. } => ErrorCode::UserNotFound,
            SubscriptionError::MalformedPayload { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a human-readable error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::UserNotFound { account_id } => {
                format!("No user linked to FastSpring account: {}", account_id)
            }
            SubscriptionError::MalformedPayload { field, message } => {
                format!("Malformed payload at '{}': {}", field, message)
            }
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if redelivering the same event may succeed.
    ///
    /// Advisory only: it is logged with the failure, but every failed event
    /// stays unacknowledged, so FastSpring redelivers it until its own retry
    /// schedule gives up.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::UserNotFound { .. } | SubscriptionError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => SubscriptionError::MalformedPayload {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::EmptyField { field } | ValidationError::InvalidFormat { field, .. } => {
                SubscriptionError::malformed(field.clone(), err.to_string())
            }
        }
    }
}
