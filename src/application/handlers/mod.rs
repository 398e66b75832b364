//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod checkout;

pub use checkout::{
    DeliverProductHandler,
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
};
