//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresUserDirectory` - FastSpring account lookup on `users`
//! - `PostgresSubscriptionRepository` - Subscriptions keyed by (user, name)
//! - `PostgresSubscriptionPeriodRepository` - Find-or-create billing periods
//! - `PostgresWebhookEventRepository` - Webhook idempotency records

mod subscription_period_repository;
mod subscription_repository;
mod user_directory;
mod webhook_event_repository;

pub use subscription_period_repository::PostgresSubscriptionPeriodRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use user_directory::PostgresUserDirectory;
pub use webhook_event_repository::PostgresWebhookEventRepository;
