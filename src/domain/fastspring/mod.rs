//! FastSpring webhook domain.
//!
//! Event envelopes, the subscription payload shape, signature verification,
//! and the idempotent processor that feeds events to their handlers.

mod event;
mod payload;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use event::{FastSpringEvent, FastSpringEventType, WebhookBatch};
pub use payload::{AccountRef, Instruction, ProductRef, SubscriptionPayload};
pub use webhook_errors::WebhookError;
pub use webhook_processor::{IdempotentWebhookProcessor, WebhookDispatcher, WebhookEventHandler};
pub use webhook_verifier::{parse_batch, FastSpringWebhookVerifier, SIGNATURE_HEADER};
