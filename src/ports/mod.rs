//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Subscription Ports
//!
//! - `UserDirectory` - Resolves FastSpring accounts to local users
//! - `SubscriptionRepository` - Subscriptions keyed by (user, name)
//! - `SubscriptionPeriodRepository` - Find-or-create billing periods
//!
//! ## Webhook Ports
//!
//! - `WebhookEventRepository` - FastSpring webhook idempotency tracking

mod subscription_period_repository;
mod subscription_repository;
mod user_directory;
mod webhook_event_repository;

pub use subscription_period_repository::SubscriptionPeriodRepository;
pub use subscription_repository::SubscriptionRepository;
pub use user_directory::UserDirectory;
pub use webhook_event_repository::{
    ProcessingOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
