//! HTTP handlers for checkout endpoints.
//!
//! These handlers connect Axum routes to application layer command handlers.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::checkout::{
    DeliverProductHandler, HandleGatewayWebhookCommand, HandleGatewayWebhookHandler,
    StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
};
use crate::domain::catalog::ProductSlug;
use crate::domain::order::{CheckoutError, EmailAddress};
use crate::ports::{CustomerRegistry, DeliveryLog, Mailer, PaymentGateway, ProductCatalog, PurchaseLedger};

use super::dto::{CheckoutResponse, CreateCheckoutRequest, ErrorResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers. The gateway and mailer are optional:
/// without a gateway only free checkout works, without a mailer deliveries are
/// logged instead of sent.
#[derive(Clone)]
pub struct CheckoutAppState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub registry: Arc<dyn CustomerRegistry>,
    pub ledger: Arc<dyn PurchaseLedger>,
    pub delivery_log: Arc<dyn DeliveryLog>,
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub download_base_url: Option<String>,
}

impl CheckoutAppState {
    /// Create handlers on demand from the shared state.
    fn deliverer(&self) -> Arc<DeliverProductHandler> {
        Arc::new(DeliverProductHandler::new(
            self.mailer.clone(),
            self.delivery_log.clone(),
            self.download_base_url.clone(),
        ))
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.catalog.clone(),
            self.registry.clone(),
            self.ledger.clone(),
            self.deliverer(),
            self.gateway.clone(),
        )
    }

    /// None when no gateway is configured: webhooks cannot be verified then.
    pub fn webhook_handler(&self) -> Option<HandleGatewayWebhookHandler> {
        let gateway = self.gateway.clone()?;
        Some(HandleGatewayWebhookHandler::new(
            gateway,
            self.catalog.clone(),
            self.registry.clone(),
            self.ledger.clone(),
            self.deliverer(),
        ))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /checkout/create-checkout - Start a checkout for a product
pub async fn create_checkout(
    State(state): State<CheckoutAppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let product_slug = ProductSlug::try_new(&request.product_slug)
        .map_err(|e| CheckoutError::validation("productSlug", e.to_string()))?;
    let email = EmailAddress::try_new(&request.email)
        .map_err(|e| CheckoutError::validation("email", e.to_string()))?;

    let handler = state.start_checkout_handler();
    let cmd = StartCheckoutCommand {
        product_slug,
        email,
        success_url: request.success_url,
        cancel_url: request.cancel_url,
    };

    let result = handler.handle(cmd).await?;

    let response = match result {
        StartCheckoutResult::Redirect { url } => {
            (StatusCode::OK, Json(CheckoutResponse::redirect(url))).into_response()
        }
        StartCheckoutResult::ProductNotFound { slug } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "PRODUCT_NOT_FOUND",
                format!("Product not found: {}", slug),
            )),
        )
            .into_response(),
        StartCheckoutResult::GatewayNotConfigured => {
            (StatusCode::OK, Json(CheckoutResponse::not_configured())).into_response()
        }
    };

    Ok(response)
}

/// POST /checkout/webhook - Handle payment gateway webhook events
pub async fn handle_gateway_webhook(
    State(state): State<CheckoutAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, CheckoutApiError> {
    // Extract the gateway signature header
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            CheckoutError::validation("Stripe-Signature", "Missing Stripe-Signature header")
        })?;

    // Without a configured gateway there is no secret to verify against,
    // so the event cannot be authenticated.
    let Some(handler) = state.webhook_handler() else {
        tracing::warn!("Webhook received but no payment gateway is configured");
        return Err(CheckoutError::invalid_webhook_signature().into());
    };

    let cmd = HandleGatewayWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok(StatusCode::OK)
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct CheckoutApiError(CheckoutError);

impl From<CheckoutError> for CheckoutApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl From<crate::domain::foundation::DomainError> for CheckoutApiError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        Self(CheckoutError::from(err))
    }
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            CheckoutError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
            // Contract: unconfigured gateway answers 200 with a null url.
            CheckoutError::GatewayNotConfigured => {
                return (StatusCode::OK, Json(CheckoutResponse::not_configured())).into_response();
            }
            CheckoutError::Gateway { .. } => (StatusCode::BAD_GATEWAY, "PAYMENT_GATEWAY_ERROR"),
            CheckoutError::InvalidWebhookSignature => {
                (StatusCode::UNAUTHORIZED, "INVALID_WEBHOOK_SIGNATURE")
            }
            CheckoutError::MissingMetadata { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            CheckoutError::EmailDelivery { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EMAIL_DELIVERY_ERROR")
            }
            CheckoutError::ValidationFailed { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            CheckoutError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCustomerRegistry, InMemoryDeliveryLog, InMemoryProductCatalog,
        InMemoryPurchaseLedger,
    };
    use crate::adapters::resend::MockMailer;
    use crate::adapters::stripe::MockPaymentGateway;
    use crate::domain::catalog::Product;
    use crate::domain::foundation::ProductId;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_product(slug: &str, price_cents: i64) -> Product {
        Product::new(
            ProductId::new(),
            ProductSlug::try_new(slug).unwrap(),
            "Test Product",
            None,
            price_cents,
            "eur",
            true,
            None,
        )
        .unwrap()
    }

    fn test_state() -> CheckoutAppState {
        CheckoutAppState {
            catalog: Arc::new(InMemoryProductCatalog::with_products(vec![
                test_product("free-pdf", 0),
                test_product("premium-pdf", 900),
            ])),
            registry: Arc::new(InMemoryCustomerRegistry::new()),
            ledger: Arc::new(InMemoryPurchaseLedger::new()),
            delivery_log: Arc::new(InMemoryDeliveryLog::new()),
            gateway: Some(Arc::new(MockPaymentGateway::new())),
            mailer: Some(Arc::new(MockMailer::new())),
            download_base_url: None,
        }
    }

    fn test_request(slug: &str) -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            product_slug: slug.to_string(),
            email: "buyer@example.com".to_string(),
            success_url: "https://example.com/success".to_string(),
            cancel_url: "https://example.com/cancel".to_string(),
        }
    }

    fn signed_headers() -> axum::http::HeaderMap {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("Stripe-Signature", "t=1,v1=test".parse().unwrap());
        headers
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_checkout_free_product_returns_200() {
        let state = test_state();
        let result = create_checkout(State(state), Json(test_request("free-pdf"))).await;

        let response = result.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_checkout_unknown_product_returns_404() {
        let state = test_state();
        let result = create_checkout(State(state), Json(test_request("no-such-thing"))).await;

        let response = result.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_checkout_without_gateway_returns_200_for_paid_product() {
        let state = CheckoutAppState {
            gateway: None,
            ..test_state()
        };
        let result = create_checkout(State(state), Json(test_request("premium-pdf"))).await;

        let response = result.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_checkout_invalid_email_returns_400() {
        let state = test_state();
        let mut request = test_request("free-pdf");
        request.email = "not-an-email".to_string();

        let err = create_checkout(State(state), Json(request)).await.err().unwrap();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_checkout_invalid_slug_returns_400() {
        let state = test_state();
        let mut request = test_request("free-pdf");
        request.product_slug = "Not A Slug!".to_string();

        let err = create_checkout(State(state), Json(request)).await.err().unwrap();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn webhook_acknowledges_recognized_event() {
        let state = test_state();
        let body = axum::body::Bytes::from_static(
            br#"{"id": "evt_1", "type": "payment_intent.payment_failed"}"#,
        );

        let result = handle_gateway_webhook(State(state), signed_headers(), body).await;
        let response = result.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_missing_signature_header_returns_400() {
        let state = test_state();
        let body = axum::body::Bytes::from_static(b"{}");

        let err = handle_gateway_webhook(State(state), axum::http::HeaderMap::new(), body)
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_bad_signature_returns_401() {
        let state = CheckoutAppState {
            gateway: Some(Arc::new(MockPaymentGateway::rejecting_webhooks())),
            ..test_state()
        };
        let body = axum::body::Bytes::from_static(b"{}");

        let err = handle_gateway_webhook(State(state), signed_headers(), body)
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_without_gateway_returns_401() {
        let state = CheckoutAppState {
            gateway: None,
            ..test_state()
        };
        let body = axum::body::Bytes::from_static(b"{}");

        let err = handle_gateway_webhook(State(state), signed_headers(), body)
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn api_error_maps_product_not_found_to_404() {
        let err = CheckoutApiError(CheckoutError::product_not_found(
            ProductSlug::try_new("gone").unwrap(),
        ));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_gateway_not_configured_to_200() {
        let err = CheckoutApiError(CheckoutError::gateway_not_configured());
        assert_eq!(err.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn api_error_maps_gateway_failure_to_502() {
        let err = CheckoutApiError(CheckoutError::gateway("session creation failed"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_maps_invalid_webhook_signature_to_401() {
        let err = CheckoutApiError(CheckoutError::invalid_webhook_signature());
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn api_error_maps_missing_metadata_to_400() {
        let err = CheckoutApiError(CheckoutError::missing_metadata("productSlug"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_email_delivery_to_500() {
        let err = CheckoutApiError(CheckoutError::email_delivery("provider down"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        let err = CheckoutApiError(CheckoutError::validation("email", "invalid format"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_infrastructure_to_500() {
        let err = CheckoutApiError(CheckoutError::infrastructure("database error"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Health Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn health_returns_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
