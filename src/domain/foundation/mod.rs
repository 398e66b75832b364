//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the Stillpoint order domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CustomerId, DeliveryAttemptId, ProductId, PurchaseId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
