//! Subscription aggregate entity.
//!
//! A Subscription is the local mirror of one FastSpring subscription owned
//! by a user. It is keyed by (user, name); the provider owns the lifecycle
//! and every webhook overwrites the billing terms wholesale.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};

/// Name given to a subscription when the provider event carries no tag.
pub const DEFAULT_SUBSCRIPTION_NAME: &str = "default";

/// Billing attributes copied verbatim from the provider.
///
/// These are the mutable fields of a subscription: each event replaces all
/// of them at once, so there is no partial update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingTerms {
    /// FastSpring subscription identifier.
    pub fastspring_id: String,

    /// Product path of the subscribed plan.
    pub plan: String,

    /// Provider lifecycle state (active, canceled, deactivated, overdue, trial).
    pub state: String,

    /// ISO currency code.
    pub currency: String,

    /// Number of seats or units.
    pub quantity: i32,

    /// Billing interval unit (day, week, month, year).
    pub interval_unit: String,

    /// Number of interval units per billing cycle.
    pub interval_length: i32,
}

/// Subscription aggregate.
///
/// # Invariants
///
/// - `id` is globally unique
/// - (`user_id`, `name`) is unique
/// - `id`, `user_id`, `name` and `created_at` never change after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub name: String,
    pub fastspring_id: String,
    pub plan: String,
    pub state: String,
    pub currency: String,
    pub quantity: i32,
    pub interval_unit: String,
    pub interval_length: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates a subscription bound to a user and name.
    pub fn create(
        id: SubscriptionId,
        user_id: UserId,
        name: impl Into<String>,
        terms: BillingTerms,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            name: name.into(),
            fastspring_id: terms.fastspring_id,
            plan: terms.plan,
            state: terms.state,
            currency: terms.currency,
            quantity: terms.quantity,
            interval_unit: terms.interval_unit,
            interval_length: terms.interval_length,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every billing attribute with the provider's latest values.
    ///
    /// Last event wins: no merge and no conflict detection.
    pub fn apply_terms(&mut self, terms: BillingTerms) {
        self.fastspring_id = terms.fastspring_id;
        self.plan = terms.plan;
        self.state = terms.state;
        self.currency = terms.currency;
        self.quantity = terms.quantity;
        self.interval_unit = terms.interval_unit;
        self.interval_length = terms.interval_length;
        self.updated_at = Timestamp::now();
    }

    /// Returns the billing attributes currently held.
    pub fn terms(&self) -> BillingTerms {
        BillingTerms {
            fastspring_id: self.fastspring_id.clone(),
            plan: self.plan.clone(),
            state: self.state.clone(),
            currency: self.currency.clone(),
            quantity: self.quantity,
            interval_unit: self.interval_unit.clone(),
            interval_length: self.interval_length,
        }
    }

    /// Active or trialling subscriptions grant access.
    pub fn is_active(&self) -> bool {
        matches!(self.state.as_str(), "active" | "trial")
    }

    pub fn is_trial(&self) -> bool {
        self.state == "trial"
    }

    /// Canceled subscriptions stay usable until the provider deactivates them.
    pub fn is_canceled(&self) -> bool {
        self.state == "canceled"
    }

    pub fn is_deactivated(&self) -> bool {
        self.state == "deactivated"
    }

    pub fn is_overdue(&self) -> bool {
        self.state == "overdue"
    }
}
