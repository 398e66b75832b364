//! Order domain module.
//!
//! Handles customer identity, purchase recording, and delivery auditing.
//!
//! # Module Structure
//!
//! - `customer` - Customer identity entity
//! - `delivery` - DeliveryAttempt audit records and outcomes
//! - `email` - EmailAddress value object
//! - `errors` - CheckoutError taxonomy
//! - `purchase` - Purchase aggregate entity
//! - `status` - PurchaseStatus state machine

mod customer;
mod delivery;
mod email;
mod errors;
mod purchase;
mod status;

pub use customer::Customer;
pub use delivery::{DeliveryAttempt, DeliveryOutcome, DeliveryStatus, EmailTemplate};
pub use email::EmailAddress;
pub use errors::CheckoutError;
pub use purchase::Purchase;
pub use status::PurchaseStatus;
