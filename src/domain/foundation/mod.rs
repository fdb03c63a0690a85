//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the UTC timestamp value object, and the error
//! types that the rest of the domain builds on.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{SubscriptionId, SubscriptionPeriodId, UserId};
pub use timestamp::Timestamp;
