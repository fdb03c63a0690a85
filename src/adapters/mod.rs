//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum webhook endpoint
//! - `postgres` - sqlx repositories
//! - `memory` - In-memory repositories for tests and local runs

pub mod http;
pub mod memory;
pub mod postgres;
