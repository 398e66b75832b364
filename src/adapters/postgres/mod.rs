//! PostgreSQL adapters - Database implementations for store ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresProductCatalog` - Product lookups by slug
//! - `PostgresCustomerRegistry` - Email-keyed customer find-or-create
//! - `PostgresPurchaseLedger` - Idempotent purchase inserts
//! - `PostgresDeliveryLog` - Append-only delivery audit rows

mod customer_registry;
mod delivery_log;
mod product_catalog;
mod purchase_ledger;

pub use customer_registry::PostgresCustomerRegistry;
pub use delivery_log::PostgresDeliveryLog;
pub use product_catalog::PostgresProductCatalog;
pub use purchase_ledger::PostgresPurchaseLedger;
