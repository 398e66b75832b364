//! Product catalog entry.
//!
//! Products are read-only from the order pipeline's point of view: they
//! are seeded by migrations or managed elsewhere, and this subsystem only
//! looks them up by slug.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: Prices stored as i64 cents, never floats
//! - **Price 0 means free**: the free path skips the payment gateway entirely
//! - **Slug is the external key**: the only identifier that crosses the
//!   gateway boundary (in metadata and redirect URLs)

use crate::domain::foundation::{ProductId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

use super::ProductSlug;

/// A sellable digital product.
///
/// # Invariants
///
/// - `price_cents >= 0` (0 is the free tier, not a sentinel)
/// - `currency` is a three-letter lowercase ISO 4217 code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier for this product.
    pub id: ProductId,

    /// Stable external key, unique across the catalog.
    pub slug: ProductSlug,

    /// Display name shown on checkout pages and in emails.
    pub name: String,

    /// Longer description shown on the gateway's checkout page.
    pub description: Option<String>,

    /// Price in minor currency units. 0 means free.
    pub price_cents: i64,

    /// ISO 4217 currency code, lowercase (e.g., "eur").
    pub currency: String,

    /// Whether the product is currently sellable.
    pub active: bool,

    /// Path of the downloadable asset delivered after purchase.
    pub asset_path: Option<String>,

    /// When the product was added to the catalog.
    pub created_at: Timestamp,
}

impl Product {
    /// Creates a new product, validating price and currency.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is empty, the price is
    /// negative, or the currency is not a three-letter lowercase code.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProductId,
        slug: ProductSlug,
        name: impl Into<String>,
        description: Option<String>,
        price_cents: i64,
        currency: impl Into<String>,
        active: bool,
        asset_path: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        if price_cents < 0 {
            return Err(ValidationError::out_of_range(
                "price_cents",
                0,
                i64::MAX,
                price_cents,
            ));
        }

        let currency = currency.into();
        validate_currency(&currency)?;

        Ok(Self {
            id,
            slug,
            name,
            description,
            price_cents,
            currency,
            active,
            asset_path,
            created_at: Timestamp::now(),
        })
    }

    /// Returns true if this product costs nothing.
    ///
    /// Free products are fulfilled synchronously with no gateway call.
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }

    /// Returns true if this is a guided-protocol product.
    ///
    /// Protocol products get a dedicated delivery email template; everything
    /// else falls back to the generic PDF template.
    pub fn is_protocol(&self) -> bool {
        self.slug.as_str().contains("protocol")
    }
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::invalid_format(
            "currency",
            "expected three-letter lowercase ISO 4217 code",
        ));
    }
    Ok(())
}
