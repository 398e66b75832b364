//! HTTP adapter for checkout endpoints.
//!
//! Exposes the order pipeline via REST API:
//! - `POST /checkout/create-checkout` - Start a checkout for a product
//! - `POST /checkout/webhook` - Handle payment gateway webhooks
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{CheckoutResponse, CreateCheckoutRequest, ErrorResponse, HealthResponse};
pub use handlers::CheckoutAppState;
pub use routes::{checkout_router, checkout_routes};
