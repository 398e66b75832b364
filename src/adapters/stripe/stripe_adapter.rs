//! Stripe payment gateway adapter.
//!
//! Real `PaymentGateway` implementation over Stripe's REST API: hosted
//! checkout session creation (form-encoded, inline price data) and webhook
//! verification.
//!
//! # Security
//!
//! - Webhook signatures are HMAC-SHA256 over `"{timestamp}.{payload}"` and
//!   compared in constant time
//! - Event timestamps outside the accepted window fail before any payload
//!   parsing happens
//! - The API key and signing secret live in `secrecy::SecretString`

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, GatewayError, PaymentGateway, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeCheckoutSession, StripePaymentIntent, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Events older than this are treated as replays and rejected.
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Allowance for event timestamps ahead of our clock.
const FUTURE_SKEW_SECS: i64 = 60;

/// Credentials and endpoint settings for the Stripe client.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key, `sk_live_...` or `sk_test_...`.
    api_key: SecretString,

    /// Webhook signing secret, `whsec_...`.
    webhook_secret: SecretString,

    /// API origin, overridable for tests against a local stub.
    api_base_url: String,

    /// When set, test-mode events are rejected at the verification step.
    require_livemode: bool,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode: false,
        }
    }

    /// Points the client at a different API origin.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Rejects test-mode events. Enable in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe-backed [`PaymentGateway`].
pub struct StripePaymentGateway {
    config: StripeConfig,
    http: reqwest::Client,
}

impl StripePaymentGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Rejects timestamps outside the replay window.
    fn check_timestamp(&self, event_timestamp: i64) -> Result<(), GatewayError> {
        let now = chrono::Utc::now().timestamp();
        let age_secs = now - event_timestamp;

        if age_secs > MAX_EVENT_AGE_SECS {
            tracing::warn!(
                event_timestamp,
                age_secs,
                "Webhook event outside the replay window"
            );
            return Err(GatewayError::invalid_webhook(format!(
                "Event too old ({age_secs} seconds)"
            )));
        }

        if age_secs < -FUTURE_SKEW_SECS {
            tracing::warn!(
                event_timestamp,
                now,
                "Webhook event timestamp is ahead of server time"
            );
            return Err(GatewayError::invalid_webhook("Event timestamp in future"));
        }

        Ok(())
    }

    /// Recomputes the v1 signature and compares it in constant time.
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
    ) -> Result<(), GatewayError> {
        self.check_timestamp(header.timestamp)?;

        let signed_payload = format!("{}.{}", header.timestamp, String::from_utf8_lossy(payload));
        let mut mac =
            HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
                .expect("HMAC accepts keys of any length");
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        if expected.as_slice().ct_eq(&header.v1_signature).unwrap_u8() != 1 {
            tracing::warn!(
                expected_signature = hex_encode(&expected),
                "Webhook signature mismatch"
            );
            return Err(GatewayError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Deserializes a verified payload into the port's event type.
    fn decode_event(&self, payload: &[u8]) -> Result<WebhookEvent, GatewayError> {
        let wire: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Webhook payload is not valid JSON");
            GatewayError::invalid_webhook(format!("Invalid JSON: {e}"))
        })?;

        if self.config.require_livemode && !wire.livemode {
            tracing::warn!(event_id = %wire.id, "Dropping test-mode event");
            return Err(GatewayError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        let event_type = WebhookEventType::from_wire(&wire.event_type);
        let data = match &event_type {
            WebhookEventType::CheckoutSessionCompleted => {
                let session: StripeCheckoutSession =
                    serde_json::from_value(wire.data.object.clone()).map_err(|e| {
                        GatewayError::invalid_webhook(format!("Invalid checkout session: {e}"))
                    })?;
                let product_slug = session.metadata_product_slug();
                let customer_email = session.metadata_customer_email();
                let gateway_email = session.collected_email();
                WebhookEventData::CheckoutCompleted {
                    session_id: session.id,
                    product_slug,
                    customer_email,
                    gateway_email,
                    gateway_customer_id: session.customer,
                    payment_id: session.payment_intent,
                    amount_total_cents: session.amount_total,
                    currency: session.currency,
                }
            }
            WebhookEventType::PaymentIntentFailed => {
                let intent: StripePaymentIntent =
                    serde_json::from_value(wire.data.object.clone()).map_err(|e| {
                        GatewayError::invalid_webhook(format!("Invalid payment intent: {e}"))
                    })?;
                WebhookEventData::PaymentFailed {
                    payment_id: intent.id,
                    failure_message: intent.last_payment_error.and_then(|e| e.message),
                }
            }
            WebhookEventType::Unknown(_) => WebhookEventData::Raw {
                json: wire.data.object.to_string(),
            },
        };

        Ok(WebhookEvent {
            id: wire.id,
            event_type,
            data,
            created_at: wire.created,
        })
    }
}

/// Builds the form body for `POST /v1/checkout/sessions`.
///
/// Prices are inlined via `price_data` because the catalog is ours; no
/// pre-registered Stripe Price objects exist. The product slug and the
/// customer email ride along as session metadata, which is how the
/// completion webhook correlates back to the catalog.
fn session_form(request: &CreateCheckoutRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("mode", "payment".to_string()),
        ("customer_email", request.customer_email.to_string()),
        (
            "line_items[0][price_data][currency]",
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.unit_amount_cents.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.product_name.clone(),
        ),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("metadata[productSlug]", request.product_slug.to_string()),
        (
            "metadata[customerEmail]",
            request.customer_email.to_string(),
        ),
    ];

    if let Some(description) = &request.product_description {
        params.push((
            "line_items[0][price_data][product_data][description]",
            description.clone(),
        ));
    }

    params
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&session_form(&request))
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                error = %error_text,
                "Stripe checkout session creation failed"
            );
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(GatewayError::authentication("Stripe rejected the API key"));
            }
            return Err(GatewayError::provider(format!(
                "Stripe API error: {error_text}"
            )));
        }

        let session: StripeCheckoutSession = response
            .json()
            .await
            .map_err(|e| GatewayError::provider(format!("Failed to parse Stripe response: {e}")))?;

        let checkout_url = session.url.ok_or_else(|| {
            GatewayError::provider("Stripe session response missing checkout URL")
        })?;

        tracing::info!(
            session_id = %session.id,
            product_slug = %request.product_slug,
            "Created Stripe checkout session"
        );

        Ok(CheckoutSession {
            id: session.id,
            url: checkout_url,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Unparseable Stripe-Signature header");
            GatewayError::invalid_webhook(e.to_string())
        })?;

        self.verify_signature(payload, &header)?;
        let event = self.decode_event(payload)?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}
