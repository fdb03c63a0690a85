//! Subscription period repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriptionId};
use crate::domain::subscription::{FindOrCreate, NewSubscriptionPeriod, SubscriptionPeriod};

/// Storage for billing periods.
///
/// Implementations must enforce uniqueness of the full period key
/// (subscription, source, start date, end date).
#[async_trait]
pub trait SubscriptionPeriodRepository: Send + Sync {
    /// Return the period stored under `key`, inserting it first when absent.
    ///
    /// Never fails because the row already exists.
    async fn find_or_create(
        &self,
        key: &NewSubscriptionPeriod,
    ) -> Result<FindOrCreate<SubscriptionPeriod>, DomainError>;

    /// List a subscription's periods ordered by start date.
    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<SubscriptionPeriod>, DomainError>;
}
