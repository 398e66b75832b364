//! Domain error types shared by every module.
//!
//! `ValidationError` covers value object construction. `DomainError` is the
//! catch-all that crosses port boundaries, pairing a stable machine-readable
//! [`ErrorCode`] with a human-readable message.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Rejected input during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: String },

    #[error("{field} must lie in {min}..={max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField {
            field: field.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        Self::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            Self::EmptyField { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }
}

/// Stable error codes exposed to API clients.
///
/// The screaming-snake rendering is part of the API contract; renaming a
/// variant here must not change its string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,

    // Lookups
    ProductNotFound,
    CustomerNotFound,
    PurchaseNotFound,

    // State
    InvalidStateTransition,
    PurchaseAlreadyRecorded,

    // Authorization
    Unauthorized,

    // External services
    PaymentGatewayError,
    PaymentNotConfigured,
    InvalidWebhookSignature,
    EmailDeliveryError,

    // Infrastructure
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// The wire rendering of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::EmptyField => "EMPTY_FIELD",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::CustomerNotFound => "CUSTOMER_NOT_FOUND",
            Self::PurchaseNotFound => "PURCHASE_NOT_FOUND",
            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            Self::PurchaseAlreadyRecorded => "PURCHASE_ALREADY_RECORDED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::PaymentGatewayError => "PAYMENT_GATEWAY_ERROR",
            Self::PaymentNotConfigured => "PAYMENT_NOT_CONFIGURED",
            Self::InvalidWebhookSignature => "INVALID_WEBHOOK_SIGNATURE",
            Self::EmailDeliveryError => "EMAIL_DELIVERY_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error carried across port boundaries.
///
/// Adapters attach context through `details` instead of growing the message
/// string, so callers can log structured fields.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Validation failure tied to a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Attaches one key-value pair of context.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
