//! Typed view of a subscription event's `data` object.
//!
//! Mirrors the expansion-enabled webhook shape, where `account` and
//! `product` arrive as nested objects instead of bare identifiers.

use serde::{Deserialize, Serialize};

use crate::domain::subscription::{BillingTerms, SubscriptionError};

/// Payload of `subscription.*` lifecycle events.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    /// FastSpring subscription identifier.
    pub id: String,
    pub account: AccountRef,
    /// Free-form tags attached at checkout; only `name` is read.
    #[serde(default)]
    pub tags: serde_json::Value,
    pub product: ProductRef,
    pub state: String,
    pub currency: String,
    pub quantity: i32,
    pub interval_unit: String,
    pub interval_length: i32,
    #[serde(default)]
    pub instructions: Option<Vec<Instruction>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductRef {
    pub product: String,
}

/// One billing period as FastSpring reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    #[serde(default)]
    pub period_start_date_in_seconds: Option<i64>,
    #[serde(default)]
    pub period_end_date_in_seconds: Option<i64>,
}

impl Instruction {
    /// Returns both boundaries, or `None` when either is missing.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        Some((
            self.period_start_date_in_seconds?,
            self.period_end_date_in_seconds?,
        ))
    }
}

impl SubscriptionPayload {
    /// Decodes the payload from an event's `data` value.
    pub fn from_value(data: &serde_json::Value) -> Result<Self, SubscriptionError> {
        Self::deserialize(data).map_err(|e| SubscriptionError::malformed("data", e.to_string()))
    }

    /// Subscription name from `tags.name`, falling back to `default` when
    /// the tag is absent, not a string, or blank.
    pub fn subscription_name(&self, default: &str) -> String {
        self.tags
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Billing attributes to copy onto the local subscription.
    pub fn billing_terms(&self) -> BillingTerms {
        BillingTerms {
            fastspring_id: self.id.clone(),
            plan: self.product.product.clone(),
            state: self.state.clone(),
            currency: self.currency.clone(),
            quantity: self.quantity,
            interval_unit: self.interval_unit.clone(),
            interval_length: self.interval_length,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        self.instructions.as_deref().unwrap_or_default()
    }
}
