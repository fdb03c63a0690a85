//! Subscription repository port.
//!
//! Defines the contract for persisting and retrieving Subscription
//! aggregates.
//!
//! # Design
//!
//! - **Keyed by (user, name)**: each user holds at most one subscription
//!   per name, and lookups always name the key
//! - **Upsert on save**: concurrent writers for the same key converge on
//!   one row instead of creating duplicates

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::Subscription;

/// Repository port for Subscription aggregate persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find the subscription a user holds under `name`.
    async fn find_by_user_and_name(
        &self,
        user_id: &UserId,
        name: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// List every subscription a user holds, oldest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError>;

    /// Insert or overwrite the subscription keyed by (user, name).
    ///
    /// When another row already holds the key, its billing terms are
    /// replaced and its identity is kept. Returns the stored row, whose `id`
    /// may therefore differ from the argument's when a concurrent writer
    /// created the row first.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<Subscription, DomainError>;
}
