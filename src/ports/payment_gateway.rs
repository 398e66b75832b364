//! Payment gateway port for external payment processing.
//!
//! Defines the contract for the hosted-checkout payment provider (e.g.,
//! Stripe). Implementations handle session creation, webhook signature
//! verification, and event parsing.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any hosted-checkout provider
//! - **One-time payments**: Single line item, no recurring billing
//! - **Metadata correlation**: The product slug and customer email ride in
//!   session metadata; the completion webhook is the only moment they come
//!   back, so they must survive the round trip verbatim

use crate::domain::catalog::ProductSlug;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::order::{CheckoutError, EmailAddress};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment gateway integrations.
///
/// `verify_webhook` is the sole authentication boundary for the whole
/// fulfillment pipeline; nothing downstream of it re-checks authenticity.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for a single product.
    ///
    /// Returns a URL for the customer to complete payment.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// Returns the parsed event if valid, error if the signature is
    /// invalid, stale, or malformed.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, GatewayError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Slug of the product being purchased (stored as session metadata).
    pub product_slug: ProductSlug,

    /// Display name shown on the gateway's checkout page.
    pub product_name: String,

    /// Display description shown on the gateway's checkout page.
    pub product_description: Option<String>,

    /// Price in minor currency units.
    pub unit_amount_cents: i64,

    /// ISO currency code, lowercase.
    pub currency: String,

    /// Customer email for pre-fill (also stored as session metadata).
    pub customer_email: EmailAddress,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for the customer to complete checkout.
    pub url: String,
}

/// Webhook event from the payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from the provider.
    pub id: String,

    /// Event type.
    pub event_type: WebhookEventType,

    /// Event payload.
    pub data: WebhookEventData,

    /// When the event occurred (Unix timestamp).
    pub created_at: i64,
}

/// Types of webhook events we handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,

    /// A payment attempt failed.
    PaymentIntentFailed,

    /// Unknown event type, carried verbatim for logging.
    Unknown(String),
}

impl WebhookEventType {
    /// Parse a provider event-type string.
    pub fn from_wire(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => WebhookEventType::CheckoutSessionCompleted,
            "payment_intent.payment_failed" => WebhookEventType::PaymentIntentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookEventType::CheckoutSessionCompleted => write!(f, "checkout.session.completed"),
            WebhookEventType::PaymentIntentFailed => write!(f, "payment_intent.payment_failed"),
            WebhookEventType::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Webhook event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEventData {
    /// Completed checkout session data.
    #[serde(rename = "checkout")]
    CheckoutCompleted {
        /// Provider's session ID.
        session_id: String,

        /// Product slug from session metadata, if present.
        product_slug: Option<String>,

        /// Customer email from session metadata, if present.
        customer_email: Option<String>,

        /// Email the gateway collected at checkout; fallback when
        /// metadata lacks one.
        gateway_email: Option<String>,

        /// Provider's customer ID, if the session created one.
        gateway_customer_id: Option<String>,

        /// Provider's payment ID for the captured charge.
        payment_id: Option<String>,

        /// Total charged in minor units, as the gateway reports it.
        amount_total_cents: Option<i64>,

        /// Currency of the charge.
        currency: Option<String>,
    },

    /// Failed payment data.
    #[serde(rename = "payment_failed")]
    PaymentFailed {
        /// Provider's payment ID.
        payment_id: String,

        /// Provider's failure description, if any.
        failure_message: Option<String>,
    },

    /// Raw/unknown event data.
    #[serde(rename = "raw")]
    Raw { json: String },
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }

    /// Create an invalid webhook error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidWebhook, message)
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let code = match err.code {
            GatewayErrorCode::InvalidWebhook => ErrorCode::InvalidWebhookSignature,
            _ => ErrorCode::PaymentGatewayError,
        };
        DomainError::new(code, err.message)
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        match err.code {
            GatewayErrorCode::InvalidWebhook => CheckoutError::invalid_webhook_signature(),
            _ => CheckoutError::gateway(err.message),
        }
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Malformed or rejected request.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature or payload.
    InvalidWebhook,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError | GatewayErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            GatewayErrorCode::InvalidWebhook => "invalid_webhook",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn event_type_parses_known_wire_strings() {
        assert_eq!(
            WebhookEventType::from_wire("checkout.session.completed"),
            WebhookEventType::CheckoutSessionCompleted
        );
        assert_eq!(
            WebhookEventType::from_wire("payment_intent.payment_failed"),
            WebhookEventType::PaymentIntentFailed
        );
    }

    #[test]
    fn event_type_preserves_unknown_wire_strings() {
        let parsed = WebhookEventType::from_wire("invoice.paid");
        assert_eq!(parsed, WebhookEventType::Unknown("invoice.paid".to_string()));
        assert_eq!(parsed.to_string(), "invoice.paid");
    }

    #[test]
    fn event_type_display_round_trips() {
        assert_eq!(
            WebhookEventType::CheckoutSessionCompleted.to_string(),
            "checkout.session.completed"
        );
        assert_eq!(
            WebhookEventType::PaymentIntentFailed.to_string(),
            "payment_intent.payment_failed"
        );
    }

    #[test]
    fn gateway_error_retryable() {
        assert!(GatewayErrorCode::NetworkError.is_retryable());
        assert!(GatewayErrorCode::RateLimitExceeded.is_retryable());

        assert!(!GatewayErrorCode::InvalidWebhook.is_retryable());
        assert!(!GatewayErrorCode::AuthenticationError.is_retryable());
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::invalid_webhook("Signature mismatch");
        assert!(err.to_string().contains("invalid_webhook"));
        assert!(err.to_string().contains("Signature mismatch"));
    }

    #[test]
    fn invalid_webhook_converts_to_signature_error() {
        let err = GatewayError::invalid_webhook("bad signature");
        let checkout_err: CheckoutError = err.into();
        assert!(matches!(checkout_err, CheckoutError::InvalidWebhookSignature));
    }

    #[test]
    fn provider_error_converts_to_gateway_error() {
        let err = GatewayError::provider("internal error");
        let checkout_err: CheckoutError = err.into();
        assert!(matches!(checkout_err, CheckoutError::Gateway { .. }));
    }

    #[test]
    fn gateway_error_converts_to_domain_error() {
        let err = GatewayError::invalid_webhook("bad signature");
        let domain_err: DomainError = err.into();
        assert_eq!(domain_err.code, ErrorCode::InvalidWebhookSignature);
    }
}
