//! HTTP adapter for FastSpring webhooks.
//!
//! - `POST /webhooks/fastspring` - Receive a FastSpring event batch
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, HealthResponse, WebhookAcknowledgement};
pub use handlers::{WebhookApiError, WebhookAppState};
pub use routes::{webhook_router, webhook_routes};
