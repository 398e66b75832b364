//! Catalog module - sellable products.
//!
//! Read-only from the order pipeline's perspective: products are looked
//! up by slug at checkout time and during webhook fulfillment.

mod product;
mod slug;

pub use product::Product;
pub use slug::ProductSlug;
