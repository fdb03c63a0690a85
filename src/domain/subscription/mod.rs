//! Subscription domain module.
//!
//! Local records mirroring FastSpring subscriptions and their billing periods.
//!
//! # Module Structure
//!
//! - `aggregate` - Subscription entity and its billing terms
//! - `period` - Billing period rows and their find-or-create key
//! - `errors` - Reconciliation errors

mod aggregate;
mod errors;
mod period;

pub use aggregate::{BillingTerms, Subscription, DEFAULT_SUBSCRIPTION_NAME};
pub use errors::SubscriptionError;
pub use period::{FindOrCreate, NewSubscriptionPeriod, PeriodSource, SubscriptionPeriod};
