//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Sellable product definitions (read-only here)
//! - `order` - Customer identity, purchase ledger, and delivery auditing

pub mod catalog;
pub mod foundation;
pub mod order;
