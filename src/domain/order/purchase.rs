//! Purchase aggregate entity.
//!
//! A Purchase records one fulfilled (or exceptionally failed/refunded)
//! transaction: who bought which product, for how much, and whether the
//! delivery email has gone out.
//!
//! # Design Decisions
//!
//! - **Money in cents**: amounts are i64 minor units, never floats
//! - **Deferred creation**: paid purchases are only recorded once the
//!   gateway confirms payment, so abandoned checkouts leave no rows
//! - **Gateway payment id as idempotency key**: unique when present,
//!   enforced at the store layer so webhook replays cannot double-record

use crate::domain::foundation::{CustomerId, ProductId, PurchaseId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

use super::PurchaseStatus;

/// A recorded purchase.
///
/// # Invariants
///
/// - `amount_cents >= 0`
/// - `gateway_payment_id` is unique when present (store-enforced)
/// - Free purchases have `amount_cents == 0` and no gateway payment id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique identifier for this purchase.
    pub id: PurchaseId,

    /// Customer who made the purchase.
    pub customer_id: CustomerId,

    /// Product that was purchased.
    pub product_id: ProductId,

    /// Amount paid in minor currency units.
    ///
    /// The gateway-reported total is authoritative; the catalog price is
    /// only a fallback when the event omits it.
    pub amount_cents: i64,

    /// ISO 4217 currency code, lowercase.
    pub currency: String,

    /// Gateway payment id; None for free purchases.
    pub gateway_payment_id: Option<String>,

    /// Current lifecycle status.
    pub status: PurchaseStatus,

    /// Whether the delivery email has been confirmed sent.
    pub email_sent: bool,

    /// When the purchase was recorded.
    pub created_at: Timestamp,
}

impl Purchase {
    /// Creates a completed free purchase (amount 0, no gateway id).
    ///
    /// Free products are fulfilled synchronously at checkout time, so
    /// the purchase is born completed.
    pub fn completed_free(
        customer_id: CustomerId,
        product_id: ProductId,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: PurchaseId::new(),
            customer_id,
            product_id,
            amount_cents: 0,
            currency: currency.into(),
            gateway_payment_id: None,
            status: PurchaseStatus::Completed,
            email_sent: false,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a completed paid purchase from a verified gateway event.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is negative or the
    /// gateway payment id is empty.
    pub fn completed_paid(
        customer_id: CustomerId,
        product_id: ProductId,
        amount_cents: i64,
        currency: impl Into<String>,
        gateway_payment_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::out_of_range(
                "amount_cents",
                0,
                i64::MAX,
                amount_cents,
            ));
        }

        let gateway_payment_id = gateway_payment_id.into();
        if gateway_payment_id.is_empty() {
            return Err(ValidationError::empty_field("gateway_payment_id"));
        }

        Ok(Self {
            id: PurchaseId::new(),
            customer_id,
            product_id,
            amount_cents,
            currency: currency.into(),
            gateway_payment_id: Some(gateway_payment_id),
            status: PurchaseStatus::Completed,
            email_sent: false,
            created_at: Timestamp::now(),
        })
    }

    /// Marks the delivery email as sent.
    ///
    /// Written only after the email provider confirms the send; a timeout
    /// or provider failure leaves the flag false while the purchase stays
    /// completed.
    pub fn mark_email_sent(&mut self) {
        self.email_sent = true;
    }
}
