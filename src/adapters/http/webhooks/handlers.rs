//! HTTP handlers for the FastSpring webhook endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::fastspring::{
    parse_batch, FastSpringWebhookVerifier, IdempotentWebhookProcessor, WebhookBatch,
    WebhookError, SIGNATURE_HEADER,
};
use crate::ports::WebhookResult;

use super::dto::{ErrorResponse, HealthResponse, WebhookAcknowledgement};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook endpoints.
#[derive(Clone)]
pub struct WebhookAppState {
    pub processor: Arc<IdempotentWebhookProcessor>,
    /// Signature checks are skipped when no secret is configured.
    pub verifier: Option<Arc<FastSpringWebhookVerifier>>,
}

impl WebhookAppState {
    fn decode_batch(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookBatch, WebhookError> {
        match &self.verifier {
            Some(verifier) => {
                let signature = headers
                    .get(SIGNATURE_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(WebhookError::MissingSignature)?;
                verifier.verify_and_parse(body, signature)
            }
            None => parse_batch(body),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/fastspring - Process a FastSpring event batch
///
/// Responds 202 with the ids of the events that need no redelivery.
pub async fn handle_fastspring_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookApiError> {
    let batch = state.decode_batch(&headers, &body)?;
    let received = batch.events.len();

    let mut acknowledged = Vec::with_capacity(received);
    for event in &batch.events {
        // A failed event is left out of the acknowledgement so FastSpring
        // redelivers it.
        if let Ok(WebhookResult::Processed | WebhookResult::AlreadyProcessed) =
            state.processor.process(event).await
        {
            acknowledged.push(event.id.clone());
        }
    }

    tracing::info!(
        received,
        acknowledged = acknowledged.len(),
        "FastSpring webhook batch handled"
    );

    let ack = WebhookAcknowledgement::new(acknowledged);
    Ok((
        StatusCode::ACCEPTED,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ack.to_body(),
    )
        .into_response())
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let error_code = match &self.0 {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::ParseError(_) => "INVALID_PAYLOAD",
            WebhookError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            WebhookError::UserNotFound(_) => "USER_NOT_FOUND",
            WebhookError::Ignored(_) => "IGNORED",
            WebhookError::Database(_) => "INTERNAL_ERROR",
        };

        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Webhook request failed");
        } else {
            tracing::warn!(error = %self.0, "Webhook request rejected");
        }

        let body = ErrorResponse::new(error_code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}
