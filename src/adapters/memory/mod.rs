//! In-memory adapters for testing.

mod stores;

pub use stores::{
    InMemoryCustomerRegistry, InMemoryDeliveryLog, InMemoryProductCatalog, InMemoryPurchaseLedger,
};
