//! HTTP DTOs (Data Transfer Objects) for checkout endpoints.
//!
//! These types define the JSON request/response structure for the checkout API.
//! They serve as the boundary between HTTP and the application layer. The wire
//! format is camelCase to match the storefront client.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a checkout for a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Slug of the product to buy.
    pub product_slug: String,
    /// Buyer's email address.
    pub email: String,
    /// URL to redirect after successful checkout.
    pub success_url: String,
    /// URL to redirect after cancelled checkout.
    pub cancel_url: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for checkout initiation.
///
/// `url` is always present in the JSON, null when no redirect exists (the
/// gateway is not configured); `message` appears only in that null case.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    /// Redirect URL for the buyer, or null.
    pub url: Option<String>,
    /// Explanation when no URL could be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckoutResponse {
    /// A successful checkout pointing the buyer at `url`.
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            message: None,
        }
    }

    /// Paid checkout is unavailable because no gateway is configured.
    pub fn not_configured() -> Self {
        Self {
            url: None,
            message: Some("Payment processing is not configured".to_string()),
        }
    }
}

/// Response for the liveness probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
