//! FastSpring configuration

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::subscription::DEFAULT_SUBSCRIPTION_NAME;

/// Upper bound for `webhook_retention_days`.
pub const MAX_WEBHOOK_RETENTION_DAYS: u32 = 3650;

/// FastSpring webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FastSpringConfig {
    /// HMAC secret for `X-FS-Signature`; signatures are required when set
    pub webhook_secret: Option<SecretString>,

    /// Subscription name used when an event carries no `tags.name`
    #[serde(default = "default_subscription_name")]
    pub default_subscription_name: String,

    /// Days to keep webhook idempotency records; 0 keeps them forever
    #[serde(default = "default_webhook_retention_days")]
    pub webhook_retention_days: u32,
}

impl FastSpringConfig {
    pub fn verifies_signatures(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Validate FastSpring configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && self.webhook_secret.is_none() {
            return Err(ValidationError::WebhookSecretRequired);
        }
        if self.default_subscription_name.trim().is_empty() {
            return Err(ValidationError::BlankSubscriptionName);
        }
        if self.webhook_retention_days > MAX_WEBHOOK_RETENTION_DAYS {
            return Err(ValidationError::RetentionTooLong(MAX_WEBHOOK_RETENTION_DAYS));
        }
        Ok(())
    }

    /// Oldest `processed_at` an idempotency record may keep at `now`.
    ///
    /// `None` when retention is disabled or the window reaches past the
    /// representable date range.
    pub fn retention_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.webhook_retention_days == 0 {
            return None;
        }
        now.checked_sub_signed(Duration::days(i64::from(self.webhook_retention_days)))
    }
}

impl Default for FastSpringConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            default_subscription_name: default_subscription_name(),
            webhook_retention_days: default_webhook_retention_days(),
        }
    }
}

fn default_subscription_name() -> String {
    DEFAULT_SUBSCRIPTION_NAME.to_string()
}

fn default_webhook_retention_days() -> u32 {
    30
}
