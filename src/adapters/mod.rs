//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST API surface
//! - `memory` - In-memory store adapters for testing
//! - `postgres` - Postgres store adapters
//! - `resend` - Resend transactional email adapter
//! - `stripe` - Stripe payment gateway adapter

pub mod http;
pub mod memory;
pub mod postgres;
pub mod resend;
pub mod stripe;
