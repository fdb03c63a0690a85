//! FastSpring webhook event types.
//!
//! FastSpring posts events in batches: `{"events": [ ... ]}`. Each event
//! carries its own id, type and `data` object. Only the envelope is typed
//! here; `data` is decoded per event type by the listener that owns it.

use serde::{Deserialize, Serialize};

/// Body of a FastSpring webhook delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookBatch {
    pub events: Vec<FastSpringEvent>,
}

/// A single FastSpring webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FastSpringEvent {
    /// Unique event identifier, used as the idempotency key.
    pub id: String,

    /// Event type (e.g., "subscription.activated").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Whether the event comes from the live store (vs test).
    #[serde(default)]
    pub live: bool,

    /// Whether FastSpring already considers the event processed.
    #[serde(default)]
    pub processed: bool,

    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub created: i64,

    /// Event-specific payload (expansion-enabled shape).
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FastSpringEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> FastSpringEventType {
        FastSpringEventType::from_str(&self.event_type)
    }
}

/// FastSpring event types this service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FastSpringEventType {
    SubscriptionActivated,
    SubscriptionCanceled,
    SubscriptionDeactivated,
    SubscriptionPaymentOverdue,
    /// Any other event type; acknowledged without processing.
    Unknown,
}

impl FastSpringEventType {
    /// Parse event type from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s {
            "subscription.activated" => Self::SubscriptionActivated,
            "subscription.canceled" => Self::SubscriptionCanceled,
            "subscription.deactivated" => Self::SubscriptionDeactivated,
            "subscription.payment.overdue" => Self::SubscriptionPaymentOverdue,
            _ => Self::Unknown,
        }
    }

    /// Convert to the FastSpring event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionActivated => "subscription.activated",
            Self::SubscriptionCanceled => "subscription.canceled",
            Self::SubscriptionDeactivated => "subscription.deactivated",
            Self::SubscriptionPaymentOverdue => "subscription.payment.overdue",
            Self::Unknown => "unknown",
        }
    }
}
