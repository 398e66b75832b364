//! Mailer port for the transactional email provider.
//!
//! Defines the contract for sending product-delivery emails (e.g., Resend).
//! The sender address and API credential live in the adapter; callers only
//! describe the message.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::order::EmailAddress;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for transactional email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one email.
    ///
    /// Returns the provider's message id on acceptance.
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailerError>;
}

/// An outbound email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: EmailAddress,

    /// Subject line.
    pub subject: String,

    /// HTML body.
    pub html: String,
}

/// Provider acknowledgement for an accepted email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentEmail {
    /// Provider's message id.
    pub provider_message_id: String,
}

/// Errors from email provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerError {
    /// Error code for categorization.
    pub code: MailerErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl MailerError {
    /// Create a new mailer error.
    pub fn new(code: MailerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(MailerErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(MailerErrorCode::AuthenticationError, message)
    }

    /// Create a rejected-by-provider error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(MailerErrorCode::Rejected, message)
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(MailerErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for MailerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MailerError {}

impl From<MailerError> for DomainError {
    fn from(err: MailerError) -> Self {
        DomainError::new(ErrorCode::EmailDeliveryError, err.message)
    }
}

/// Mailer error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailerErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Provider rejected the message (bad recipient, content, quota).
    Rejected,

    /// Provider API error.
    ProviderError,
}

impl MailerErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MailerErrorCode::NetworkError | MailerErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for MailerErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MailerErrorCode::NetworkError => "network_error",
            MailerErrorCode::AuthenticationError => "authentication_error",
            MailerErrorCode::Rejected => "rejected",
            MailerErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn mailer_is_object_safe() {
        fn _accepts_dyn(_mailer: &dyn Mailer) {}
    }

    #[test]
    fn mailer_error_retryable() {
        assert!(MailerErrorCode::NetworkError.is_retryable());
        assert!(MailerErrorCode::ProviderError.is_retryable());

        assert!(!MailerErrorCode::AuthenticationError.is_retryable());
        assert!(!MailerErrorCode::Rejected.is_retryable());
    }

    #[test]
    fn mailer_error_display() {
        let err = MailerError::rejected("Invalid recipient");
        assert!(err.to_string().contains("rejected"));
        assert!(err.to_string().contains("Invalid recipient"));
    }

    #[test]
    fn mailer_error_converts_to_domain_error() {
        let err = MailerError::provider("Service unavailable");
        let domain_err: DomainError = err.into();
        assert_eq!(domain_err.code, ErrorCode::EmailDeliveryError);
    }
}
