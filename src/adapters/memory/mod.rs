//! In-memory adapters.
//!
//! Implementations of every port backed by `tokio::sync::RwLock` maps. They
//! honour the same uniqueness keys as the Postgres schema, which makes them
//! suitable for tests and for running the service without a database.

mod subscriptions;
mod users;
mod webhook_events;

pub use subscriptions::{InMemorySubscriptionPeriodRepository, InMemorySubscriptionRepository};
pub use users::InMemoryUserDirectory;
pub use webhook_events::InMemoryWebhookEventRepository;
