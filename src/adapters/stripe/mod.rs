//! Stripe implementation of the `PaymentGateway` port.
//!
//! Covers the two calls checkout needs: creating hosted checkout sessions
//! for one-time payments and verifying inbound webhooks. `MockPaymentGateway`
//! lives here too so tests can swap Stripe out behind the same port.
//!
//! Webhook verification recomputes the HMAC-SHA256 signature, compares it
//! in constant time, and bounds the signed timestamp to a five-minute
//! replay window.

mod mock_payment_gateway;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_gateway::MockPaymentGateway;
pub use stripe_adapter::{StripeConfig, StripePaymentGateway};
pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripeCheckoutSession, StripePaymentIntent,
    StripeWebhookEvent,
};
