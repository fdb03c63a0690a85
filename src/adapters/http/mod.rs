//! HTTP adapters - REST API implementations.

pub mod webhooks;

pub use webhooks::{webhook_router, WebhookAppState};
