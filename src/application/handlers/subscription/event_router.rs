//! Routes FastSpring webhook events to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::fastspring::{FastSpringEventType, WebhookDispatcher, WebhookEventHandler};

/// Dispatcher keyed by event type.
///
/// A handler is registered for every type it reports through
/// [`WebhookEventHandler::handles`]; a later registration for the same type
/// replaces the earlier one.
#[derive(Default)]
pub struct SubscriptionEventRouter {
    handlers: HashMap<FastSpringEventType, Arc<dyn WebhookEventHandler>>,
}

impl SubscriptionEventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        for event_type in handler.handles() {
            self.handlers.insert(event_type, handler.clone());
        }
        self
    }

    /// Event types with a registered handler.
    pub fn routed_types(&self) -> Vec<FastSpringEventType> {
        self.handlers.keys().copied().collect()
    }
}

#[async_trait]
impl WebhookDispatcher for SubscriptionEventRouter {
    fn get_handler(&self, event_type: &FastSpringEventType) -> Option<&dyn WebhookEventHandler> {
        if *event_type == FastSpringEventType::Unknown {
            return None;
        }
        self.handlers.get(event_type).map(|h| h.as_ref())
    }
}
