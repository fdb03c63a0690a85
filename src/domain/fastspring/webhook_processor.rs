//! Webhook processor - Orchestrates idempotent webhook event handling.
//!
//! ## Design
//!
//! The processor follows these steps:
//! 1. Skip events already recorded as processed (idempotency key = event id)
//! 2. Dispatch to the handler registered for the event type
//! 3. Record successful and ignored outcomes
//!
//! Failed events are not recorded, so FastSpring's redelivery retries them.
//!
//! ## Race Condition Handling
//!
//! When two deliveries of one event arrive simultaneously both may run the
//! handler; handlers write through keyed upserts so the end state is the
//! same. The first record to be saved wins, the other reports
//! `AlreadyProcessed`.

use std::sync::Arc;

use async_trait::async_trait;

use super::event::{FastSpringEvent, FastSpringEventType};
use super::webhook_errors::WebhookError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult};

/// Handler for one or more FastSpring event types.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Returns the event type(s) this handler processes.
    fn handles(&self) -> Vec<FastSpringEventType>;

    /// Handles the webhook event.
    ///
    /// Returns `Err(WebhookError::Ignored(_))` if the event should be
    /// acknowledged without being processed.
    async fn handle(&self, event: &FastSpringEvent) -> Result<(), WebhookError>;
}

/// Routes webhook events to the appropriate handler.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Find a handler for the given event type.
    fn get_handler(&self, event_type: &FastSpringEventType) -> Option<&dyn WebhookEventHandler>;

    /// Dispatch an event to its handler.
    ///
    /// Returns `Err(WebhookError::Ignored)` if no handler is registered.
    async fn dispatch(&self, event: &FastSpringEvent) -> Result<(), WebhookError> {
        let event_type = event.parsed_type();
        match self.get_handler(&event_type) {
            Some(handler) => handler.handle(event).await,
            None => Err(WebhookError::Ignored(format!(
                "No handler for event type: {}",
                event.event_type
            ))),
        }
    }
}

/// Processes webhook events with idempotency guarantees.
#[derive(Clone)]
pub struct IdempotentWebhookProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl IdempotentWebhookProcessor {
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Process a webhook event at most once.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - Event was handled or ignored
    /// - `Ok(WebhookResult::AlreadyProcessed)` - Event was handled before
    /// - `Err(_)` - Handling failed; nothing was recorded
    pub async fn process(&self, event: &FastSpringEvent) -> Result<WebhookResult, WebhookError> {
        if self.repository.find_by_event_id(&event.id).await?.is_some() {
            tracing::debug!(event_id = %event.id, "Skipping already processed event");
            return Ok(WebhookResult::AlreadyProcessed);
        }

        let payload = serde_json::to_value(event)
            .map_err(|e| WebhookError::ParseError(format!("Failed to serialize event: {}", e)))?;

        let record = match self.dispatcher.dispatch(event).await {
            Ok(()) => WebhookEventRecord::success(&event.id, &event.event_type, payload),
            Err(WebhookError::Ignored(reason)) => {
                tracing::debug!(event_id = %event.id, event_type = %event.event_type, %reason, "Ignoring event");
                WebhookEventRecord::ignored(&event.id, &event.event_type, reason, payload)
            }
            Err(e) => {
                tracing::warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    retryable = e.is_retryable(),
                    "Webhook event failed: {}",
                    e
                );
                return Err(e);
            }
        };

        match self.repository.save(record).await? {
            SaveResult::Inserted => Ok(WebhookResult::Processed),
            SaveResult::AlreadyExists => Ok(WebhookResult::AlreadyProcessed),
        }
    }
}
