//! Purchase ledger port.
//!
//! The append point for order state. Purchases are written once per
//! fulfilled transaction; the only later update is the email-sent flag.
//!
//! ## Why Insert-or-Ignore Matters
//!
//! The payment gateway delivers webhooks at least once, so the same
//! completed-checkout event can arrive twice and re-run fulfillment.
//! The gateway payment id is the natural idempotency key: implementations
//! enforce it with a unique constraint and `ON CONFLICT DO NOTHING`
//! semantics, so a replay reports [`CreateOutcome::AlreadyRecorded`]
//! instead of writing a duplicate row. Free purchases carry no payment id
//! and are exempt (each free checkout is a distinct purchase).

use crate::domain::foundation::{DomainError, PurchaseId};
use crate::domain::order::Purchase;
use async_trait::async_trait;

/// Result of attempting to record a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Row was inserted (first time seeing this transaction).
    Created,
    /// A purchase with this gateway payment id already exists.
    AlreadyRecorded,
}

impl CreateOutcome {
    /// Returns true if the call inserted a new row.
    pub fn was_inserted(&self) -> bool {
        matches!(self, CreateOutcome::Created)
    }
}

/// Port for purchase record persistence.
#[async_trait]
pub trait PurchaseLedger: Send + Sync {
    /// Record a purchase.
    ///
    /// Returns [`CreateOutcome::Created`] on insert, or
    /// [`CreateOutcome::AlreadyRecorded`] when a row with the same gateway
    /// payment id already exists (duplicate webhook delivery).
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create(&self, purchase: &Purchase) -> Result<CreateOutcome, DomainError>;

    /// Mark a purchase's delivery email as sent.
    ///
    /// A follow-up write, observably separate from `create`.
    ///
    /// # Errors
    ///
    /// - `PurchaseNotFound` if the purchase doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn mark_email_sent(&self, id: &PurchaseId) -> Result<(), DomainError>;
}
