//! Application layer - commands and handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    DeliverProductHandler,
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
};
