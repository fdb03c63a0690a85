//! Route configuration for the webhook endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{handle_fastspring_webhook, health, WebhookAppState};

/// Webhook routes, mounted under `/webhooks`.
///
/// Routes:
/// - `POST /fastspring` - FastSpring event batch (signature verified)
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/fastspring", post(handle_fastspring_webhook))
}

/// Complete service router.
///
/// Routes:
/// - `POST /webhooks/fastspring`
/// - `GET /health`
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/webhooks", webhook_routes())
}
