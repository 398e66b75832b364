//! Checkout handlers.
//!
//! Command handlers for the order pipeline:
//!
//! - Starting a checkout (free products fulfill immediately, paid products
//!   redirect to the payment gateway)
//! - Processing gateway webhooks (fulfillment of paid checkouts)
//! - Delivering a purchased product by email

mod deliver_product;
mod handle_gateway_webhook;
mod start_checkout;

pub use deliver_product::DeliverProductHandler;
pub use handle_gateway_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult};
