//! Subscription handlers.
//!
//! Reconcile FastSpring subscription lifecycle events into local
//! subscription and billing-period records.
//!
//! ## Commands
//! - Applying a subscription event (activated, canceled, deactivated,
//!   payment overdue)
//!
//! ## Routing
//! - `SubscriptionEventRouter` dispatches webhook events to the handler

mod event_router;
mod subscription_activated;

pub use event_router::SubscriptionEventRouter;
pub use subscription_activated::{
    SubscriptionActivatedCommand, SubscriptionActivatedHandler, SubscriptionActivatedResult,
};
