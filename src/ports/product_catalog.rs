//! Product catalog port (read side).
//!
//! Read-only lookup of sellable products. The catalog is managed by admin
//! tooling outside this pipeline; checkout only ever reads it.
//!
//! # Design
//!
//! - **Read-only**: No write operations are exposed here
//! - **Slug keyed**: The slug is the stable external key used by both the
//!   checkout request and the webhook metadata

use crate::domain::catalog::{Product, ProductSlug};
use crate::domain::foundation::DomainError;
use async_trait::async_trait;

/// Port for read-only product lookups.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Find an active product by its slug.
    ///
    /// Returns `None` if no active product matches. Inactive products are
    /// not sellable and behave as absent.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on lookup failure
    async fn find_by_slug(&self, slug: &ProductSlug) -> Result<Option<Product>, DomainError>;
}
