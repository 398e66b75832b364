//! Mock payment gateway for testing.
//!
//! Provides a configurable mock implementation of `PaymentGateway` for unit
//! and integration tests. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking
//! - Webhook event simulation

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, GatewayError, PaymentGateway, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

/// Records a single method call for test assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: String,
}

/// How the mock treats incoming webhook payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookVerifyMode {
    /// Accept any payload regardless of signature (default).
    AcceptAll,
    /// Reject every payload with an invalid-signature error.
    AlwaysFail,
}

#[derive(Debug)]
struct MockState {
    /// Next checkout session to return from `create_checkout_session`.
    next_checkout_session: Option<CheckoutSession>,
    /// Next event to return from `verify_webhook`.
    next_webhook_event: Option<WebhookEvent>,
    /// Error to return on the next call to any method. Consumed once.
    next_error: Option<GatewayError>,
    /// Errors keyed by method name. Checked before `next_error`.
    method_errors: HashMap<String, GatewayError>,
    /// Every call made through the mock, in order.
    call_log: Vec<MethodCall>,
    webhook_verify_mode: WebhookVerifyMode,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            next_checkout_session: None,
            next_webhook_event: None,
            next_error: None,
            method_errors: HashMap::new(),
            call_log: Vec::new(),
            webhook_verify_mode: WebhookVerifyMode::AcceptAll,
        }
    }
}

/// Configurable mock implementation of [`PaymentGateway`].
///
/// Cloning the mock shares state, so a test can keep a handle for
/// configuration and assertions while the clone is wired into the code
/// under test.
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

impl Clone for MockPaymentGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that rejects every webhook payload as unsigned.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Sets the session returned by the next `create_checkout_session` call.
    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.inner.lock().unwrap().next_checkout_session = Some(session);
    }

    /// Sets the event returned by the next `verify_webhook` call.
    pub fn set_webhook_event(&self, event: WebhookEvent) {
        self.inner.lock().unwrap().next_webhook_event = Some(event);
    }

    /// Sets an error returned by the next call to any method.
    pub fn set_error(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Sets an error returned whenever the named method is called.
    pub fn set_method_error(&self, method: &str, error: GatewayError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clears all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ------------------------------------------------------------------
    // Call tracking
    // ------------------------------------------------------------------

    /// Returns all recorded calls in order.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Returns true if the named method was called at least once.
    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    /// Returns how many times the named method was called.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Clears the call log.
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().call_log.clear();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn record_call(&self, method: &str, args: String) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.method_errors.get(method) {
            return Err(err.clone());
        }
        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        Ok(())
    }
}

/// Static builders for webhook events used across handler tests.
impl MockPaymentGateway {
    /// Builds a `checkout.session.completed` event carrying checkout metadata.
    pub fn checkout_completed_event(
        product_slug: &str,
        customer_email: &str,
        payment_id: &str,
        amount_total_cents: i64,
        currency: &str,
    ) -> WebhookEvent {
        let session_id = format!("cs_mock_{}", mock_suffix());
        WebhookEvent {
            id: format!("evt_mock_{}", mock_suffix()),
            event_type: WebhookEventType::CheckoutSessionCompleted,
            data: WebhookEventData::CheckoutCompleted {
                session_id,
                product_slug: Some(product_slug.to_string()),
                customer_email: Some(customer_email.to_string()),
                gateway_email: Some(customer_email.to_string()),
                gateway_customer_id: Some(format!("cus_mock_{}", mock_suffix())),
                payment_id: Some(payment_id.to_string()),
                amount_total_cents: Some(amount_total_cents),
                currency: Some(currency.to_string()),
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Builds a `payment_intent.payment_failed` event.
    pub fn payment_failed_event(payment_id: &str, failure_message: &str) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_mock_{}", mock_suffix()),
            event_type: WebhookEventType::PaymentIntentFailed,
            data: WebhookEventData::PaymentFailed {
                payment_id: payment_id.to_string(),
                failure_message: Some(failure_message.to_string()),
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

fn mock_suffix() -> String {
    Uuid::new_v4()
        .to_string()
        .split('-')
        .next()
        .unwrap_or("0000")
        .to_string()
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.record_call(
            "create_checkout_session",
            format!(
                "slug={} email={} amount={}",
                request.product_slug,
                request.customer_email,
                request.unit_amount_cents
            ),
        );
        self.check_error("create_checkout_session")?;

        if let Some(session) = self.inner.lock().unwrap().next_checkout_session.take() {
            return Ok(session);
        }

        let id = format!("cs_mock_{}", mock_suffix());
        let url = format!("https://checkout.stripe.com/c/pay/{id}");
        Ok(CheckoutSession { id, url })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        self.record_call(
            "verify_webhook",
            format!(
                "payload_len={} signature={}",
                payload.len(),
                signature_header
            ),
        );
        self.check_error("verify_webhook")?;

        let mode = self.inner.lock().unwrap().webhook_verify_mode;
        if mode == WebhookVerifyMode::AlwaysFail {
            return Err(GatewayError::invalid_webhook(
                "Webhook signature verification failed",
            ));
        }

        if let Some(event) = self.inner.lock().unwrap().next_webhook_event.take() {
            return Ok(event);
        }

        // No configured event: parse what we can out of the payload so tests
        // that post raw JSON still get a sensible event back.
        let json: serde_json::Value =
            serde_json::from_slice(payload).unwrap_or_else(|_| serde_json::json!({}));
        let event_type = json
            .get("type")
            .and_then(|t| t.as_str())
            .map(WebhookEventType::from_wire)
            .unwrap_or_else(|| WebhookEventType::Unknown("unknown".to_string()));
        let id = json
            .get("id")
            .and_then(|i| i.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("evt_mock_{}", mock_suffix()));
        Ok(WebhookEvent {
            id,
            event_type,
            data: WebhookEventData::Raw {
                json: json.to_string(),
            },
            created_at: chrono::Utc::now().timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ProductSlug;
    use crate::domain::order::EmailAddress;

    fn sample_request() -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            product_slug: ProductSlug::try_new("premium-pdf").expect("valid slug"),
            product_name: "Premium PDF".to_string(),
            product_description: None,
            unit_amount_cents: 900,
            currency: "eur".to_string(),
            customer_email: EmailAddress::try_new("buyer@example.com").expect("valid email"),
            success_url: "https://example.com/success".to_string(),
            cancel_url: "https://example.com/cancel".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_default_session_when_none_configured() {
        let mock = MockPaymentGateway::new();

        let session = mock
            .create_checkout_session(sample_request())
            .await
            .expect("should succeed");

        assert!(session.id.starts_with("cs_mock_"));
        assert!(session.url.contains(&session.id));
    }

    #[tokio::test]
    async fn returns_configured_session() {
        let mock = MockPaymentGateway::new();
        mock.set_checkout_session(CheckoutSession {
            id: "cs_configured".to_string(),
            url: "https://checkout.stripe.com/c/pay/cs_configured".to_string(),
        });

        let session = mock
            .create_checkout_session(sample_request())
            .await
            .expect("should succeed");

        assert_eq!(session.id, "cs_configured");
    }

    #[tokio::test]
    async fn configured_session_is_consumed_once() {
        let mock = MockPaymentGateway::new();
        mock.set_checkout_session(CheckoutSession {
            id: "cs_once".to_string(),
            url: "https://checkout.stripe.com/c/pay/cs_once".to_string(),
        });

        let first = mock
            .create_checkout_session(sample_request())
            .await
            .expect("should succeed");
        let second = mock
            .create_checkout_session(sample_request())
            .await
            .expect("should succeed");

        assert_eq!(first.id, "cs_once");
        assert_ne!(second.id, "cs_once");
    }

    #[tokio::test]
    async fn next_error_fails_one_call_then_clears() {
        let mock = MockPaymentGateway::new();
        mock.set_error(GatewayError::network("connection refused"));

        let first = mock.create_checkout_session(sample_request()).await;
        let second = mock.create_checkout_session(sample_request()).await;

        assert!(first.is_err());
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn method_error_persists_across_calls() {
        let mock = MockPaymentGateway::new();
        mock.set_method_error(
            "create_checkout_session",
            GatewayError::provider("stripe is down"),
        );

        assert!(mock.create_checkout_session(sample_request()).await.is_err());
        assert!(mock.create_checkout_session(sample_request()).await.is_err());

        // Other methods are unaffected.
        assert!(mock.verify_webhook(b"{}", "sig").await.is_ok());
    }

    #[tokio::test]
    async fn clear_errors_removes_both_kinds() {
        let mock = MockPaymentGateway::new();
        mock.set_error(GatewayError::network("boom"));
        mock.set_method_error("verify_webhook", GatewayError::provider("boom"));

        mock.clear_errors();

        assert!(mock.create_checkout_session(sample_request()).await.is_ok());
        assert!(mock.verify_webhook(b"{}", "sig").await.is_ok());
    }

    #[tokio::test]
    async fn records_calls_in_order() {
        let mock = MockPaymentGateway::new();

        mock.create_checkout_session(sample_request())
            .await
            .expect("should succeed");
        mock.verify_webhook(b"{}", "t=1,v1=abc")
            .await
            .expect("should succeed");

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "create_checkout_session");
        assert!(calls[0].args.contains("slug=premium-pdf"));
        assert_eq!(calls[1].method, "verify_webhook");

        assert!(mock.was_called("verify_webhook"));
        assert_eq!(mock.call_count("create_checkout_session"), 1);

        mock.clear_calls();
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let mock = MockPaymentGateway::new();
        let handle = mock.clone();

        mock.create_checkout_session(sample_request())
            .await
            .expect("should succeed");

        assert!(handle.was_called("create_checkout_session"));
    }

    #[tokio::test]
    async fn rejecting_webhooks_fails_verification() {
        let mock = MockPaymentGateway::rejecting_webhooks();

        let result = mock.verify_webhook(b"{}", "t=1,v1=abc").await;

        let err = result.expect_err("should fail");
        assert!(!err.retryable);
        assert!(mock.was_called("verify_webhook"));
    }

    #[tokio::test]
    async fn returns_configured_webhook_event() {
        let mock = MockPaymentGateway::new();
        let event = MockPaymentGateway::checkout_completed_event(
            "premium-pdf",
            "buyer@example.com",
            "pi_123",
            900,
            "eur",
        );
        mock.set_webhook_event(event);

        let verified = mock
            .verify_webhook(b"irrelevant", "sig")
            .await
            .expect("should succeed");

        assert_eq!(
            verified.event_type,
            WebhookEventType::CheckoutSessionCompleted
        );
        match verified.data {
            WebhookEventData::CheckoutCompleted {
                product_slug,
                payment_id,
                amount_total_cents,
                ..
            } => {
                assert_eq!(product_slug.as_deref(), Some("premium-pdf"));
                assert_eq!(payment_id.as_deref(), Some("pi_123"));
                assert_eq!(amount_total_cents, Some(900));
            }
            other => panic!("unexpected event data: {other:?}"),
        }
    }

    #[tokio::test]
    async fn parses_payload_when_no_event_configured() {
        let mock = MockPaymentGateway::new();
        let payload = br#"{"id": "evt_raw_1", "type": "payment_intent.payment_failed"}"#;

        let event = mock
            .verify_webhook(payload, "sig")
            .await
            .expect("should succeed");

        assert_eq!(event.id, "evt_raw_1");
        assert_eq!(event.event_type, WebhookEventType::PaymentIntentFailed);
        assert!(matches!(event.data, WebhookEventData::Raw { .. }));
    }

    #[tokio::test]
    async fn payment_failed_builder_carries_message() {
        let event = MockPaymentGateway::payment_failed_event("pi_456", "card_declined");

        match event.data {
            WebhookEventData::PaymentFailed {
                payment_id,
                failure_message,
            } => {
                assert_eq!(payment_id, "pi_456");
                assert_eq!(failure_message.as_deref(), Some("card_declined"));
            }
            other => panic!("unexpected event data: {other:?}"),
        }
    }
}
