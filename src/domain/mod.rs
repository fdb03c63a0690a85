//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `subscription` - Local subscription records and billing periods
//! - `fastspring` - Provider webhook events, verification and processing

pub mod fastspring;
pub mod foundation;
pub mod subscription;
