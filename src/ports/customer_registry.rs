//! Customer registry port.
//!
//! Find-or-create upsert of customer identities keyed by email. Customers
//! are created lazily on first purchase and never deleted by this pipeline.
//!
//! # Design
//!
//! - **Email keyed**: Email is the unique natural key
//! - **Concurrency safe**: Implementations rely on a unique constraint at
//!   the store layer, not application-level locking, so concurrent calls
//!   for the same email yield one record
//! - **Gateway id backfill**: A paid purchase may reveal a gateway customer
//!   id the record does not yet have; it is adopted without overwriting an
//!   existing value

use crate::domain::foundation::DomainError;
use crate::domain::order::{Customer, EmailAddress};
use async_trait::async_trait;

/// Port for customer identity persistence.
#[async_trait]
pub trait CustomerRegistry: Send + Sync {
    /// Find the customer for this email, creating one if absent.
    ///
    /// When `gateway_customer_id` is provided and the stored record has
    /// none, the id is backfilled. An already-stored id is never replaced.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn find_or_create(
        &self,
        email: &EmailAddress,
        gateway_customer_id: Option<&str>,
    ) -> Result<Customer, DomainError>;
}
