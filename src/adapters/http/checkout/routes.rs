//! Axum router configuration for checkout endpoints.
//!
//! This module defines the route structure for the checkout API and wires
//! routes to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_checkout, handle_gateway_webhook, health, CheckoutAppState};

/// Create the checkout API router.
///
/// # Routes
///
/// ## Storefront Endpoints (no auth, called by the public site)
/// - `POST /create-checkout` - Start a checkout for a product
///
/// ## Webhook Endpoints (no auth, signature verified)
/// - `POST /webhook` - Handle payment gateway webhooks
pub fn checkout_routes() -> Router<CheckoutAppState> {
    Router::new()
        .route("/create-checkout", post(create_checkout))
        .route("/webhook", post(handle_gateway_webhook))
}

/// Create the complete application router.
///
/// Mounts checkout routes at `/checkout` and adds the liveness probe.
///
/// # Example
///
/// ```ignore
/// use stillpoint::adapters::http::{checkout_router, CheckoutAppState};
///
/// let app_state = CheckoutAppState { /* ... */ };
/// let app = checkout_router().with_state(app_state);
/// ```
pub fn checkout_router() -> Router<CheckoutAppState> {
    Router::new()
        .nest("/checkout", checkout_routes())
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::memory::{
        InMemoryCustomerRegistry, InMemoryDeliveryLog, InMemoryProductCatalog,
        InMemoryPurchaseLedger,
    };
    use crate::adapters::resend::MockMailer;
    use crate::adapters::stripe::MockPaymentGateway;

    fn test_state() -> CheckoutAppState {
        CheckoutAppState {
            catalog: Arc::new(InMemoryProductCatalog::new()),
            registry: Arc::new(InMemoryCustomerRegistry::new()),
            ledger: Arc::new(InMemoryPurchaseLedger::new()),
            delivery_log: Arc::new(InMemoryDeliveryLog::new()),
            gateway: Some(Arc::new(MockPaymentGateway::new())),
            mailer: Some(Arc::new(MockMailer::new())),
            download_base_url: None,
        }
    }

    #[test]
    fn checkout_routes_creates_router() {
        let router = checkout_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn checkout_router_creates_combined_router() {
        let router = checkout_router();
        let _: Router<()> = router.with_state(test_state());
    }

    // Full request/response tests live in the integration test suite, which
    // drives the router with tower's oneshot.
}
