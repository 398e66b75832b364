//! Checkout and fulfillment error types.
//!
//! Errors raised by the checkout, webhook, and delivery paths. Interactive
//! checkout surfaces these to the caller; webhook fulfillment logs them and
//! acknowledges the event anyway (the gateway retries non-2xx responses
//! indefinitely).
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ProductNotFound | 404 |
//! | GatewayNotConfigured | 200 (null url + message) |
//! | Gateway | 502 |
//! | InvalidWebhookSignature | 401 |
//! | MissingMetadata | 400 |
//! | EmailDelivery | 500 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::catalog::ProductSlug;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors from the order fulfillment pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// No sellable product matches the requested slug.
    ProductNotFound(ProductSlug),

    /// No payment gateway credential is configured; paid checkout is unavailable.
    GatewayNotConfigured,

    /// The payment gateway API call failed.
    Gateway { reason: String },

    /// Webhook signature verification failed.
    InvalidWebhookSignature,

    /// A completed-checkout event arrived without a required metadata field.
    MissingMetadata { field: String },

    /// The email provider rejected the delivery.
    EmailDelivery { detail: String },

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl CheckoutError {
    // Constructor functions for cleaner error creation

    pub fn product_not_found(slug: ProductSlug) -> Self {
        CheckoutError::ProductNotFound(slug)
    }

    pub fn gateway_not_configured() -> Self {
        CheckoutError::GatewayNotConfigured
    }

    pub fn gateway(reason: impl Into<String>) -> Self {
        CheckoutError::Gateway {
            reason: reason.into(),
        }
    }

    pub fn invalid_webhook_signature() -> Self {
        CheckoutError::InvalidWebhookSignature
    }

    pub fn missing_metadata(field: impl Into<String>) -> Self {
        CheckoutError::MissingMetadata {
            field: field.into(),
        }
    }

    pub fn email_delivery(detail: impl Into<String>) -> Self {
        CheckoutError::EmailDelivery {
            detail: detail.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CheckoutError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CheckoutError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            CheckoutError::GatewayNotConfigured => ErrorCode::PaymentNotConfigured,
            CheckoutError::Gateway { .. } => ErrorCode::PaymentGatewayError,
            CheckoutError::InvalidWebhookSignature => ErrorCode::InvalidWebhookSignature,
            CheckoutError::MissingMetadata { .. } => ErrorCode::ValidationFailed,
            CheckoutError::EmailDelivery { .. } => ErrorCode::EmailDeliveryError,
            CheckoutError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CheckoutError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            CheckoutError::ProductNotFound(slug) => format!("Product not found: {}", slug),
            CheckoutError::GatewayNotConfigured => {
                "Payment processing is not configured".to_string()
            }
            CheckoutError::Gateway { reason } => format!("Payment gateway error: {}", reason),
            CheckoutError::InvalidWebhookSignature => "Invalid webhook signature".to_string(),
            CheckoutError::MissingMetadata { field } => {
                format!("Webhook event metadata is missing '{}'", field)
            }
            CheckoutError::EmailDelivery { detail } => {
                format!("Email delivery failed: {}", detail)
            }
            CheckoutError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CheckoutError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Infrastructure(_)
                | CheckoutError::Gateway { .. }
                | CheckoutError::EmailDelivery { .. }
        )
    }
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CheckoutError {}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PaymentNotConfigured => CheckoutError::GatewayNotConfigured,
            ErrorCode::PaymentGatewayError => CheckoutError::Gateway {
                reason: err.to_string(),
            },
            ErrorCode::InvalidWebhookSignature => CheckoutError::InvalidWebhookSignature,
            ErrorCode::EmailDeliveryError => CheckoutError::EmailDelivery {
                detail: err.to_string(),
            },
            ErrorCode::ValidationFailed => CheckoutError::ValidationFailed {
                field: "unknown".to_string(),
                message: err.to_string(),
            },
            _ => CheckoutError::Infrastructure(err.to_string()),
        }
    }
}

impl From<CheckoutError> for DomainError {
    fn from(err: CheckoutError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
