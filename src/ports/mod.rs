//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `ProductCatalog` - Read-only product lookup by slug
//! - `CustomerRegistry` - Find-or-create customer identity keyed by email
//! - `PurchaseLedger` - Idempotent purchase recording and email-sent flag
//! - `DeliveryLog` - Append-only delivery attempt audit log
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Hosted checkout sessions and webhook verification
//! - `Mailer` - Transactional email provider

mod customer_registry;
mod delivery_log;
mod mailer;
mod payment_gateway;
mod product_catalog;
mod purchase_ledger;

pub use customer_registry::CustomerRegistry;
pub use delivery_log::DeliveryLog;
pub use mailer::{EmailMessage, Mailer, MailerError, MailerErrorCode, SentEmail};
pub use payment_gateway::{
    CheckoutSession, CreateCheckoutRequest, GatewayError, GatewayErrorCode, PaymentGateway,
    WebhookEvent, WebhookEventData, WebhookEventType,
};
pub use product_catalog::ProductCatalog;
pub use purchase_ledger::{CreateOutcome, PurchaseLedger};
