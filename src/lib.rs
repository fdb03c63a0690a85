//! Cashier FastSpring - FastSpring subscription webhook synchronisation
//!
//! Receives FastSpring webhook batches, verifies their signature and
//! reconciles subscription lifecycle events into local subscription and
//! billing-period records.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
