//! Email address value object.
//!
//! The customer registry is keyed by email, so normalization here is what
//! makes find-or-create idempotent: the same address in different casing
//! must resolve to the same customer row.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// A validated, lowercase-normalized email address.
///
/// Validation is deliberately shallow (shape, not deliverability):
/// exactly one `@` with non-empty local and domain parts, and a dot in
/// the domain. The email provider is the real arbiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new EmailAddress, validating the basic shape.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the address is empty, lacks an `@`,
    /// or has an empty local part or domain.
    pub fn try_new(email: &str) -> Result<Self, ValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }

        let normalized = trimmed.to_lowercase();

        let mut parts = normalized.splitn(2, '@');
        let local = parts.next().unwrap_or("");
        let domain = parts.next().unwrap_or("");

        if local.is_empty() || domain.is_empty() {
            return Err(ValidationError::invalid_format(
                "email",
                "expected local@domain",
            ));
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(ValidationError::invalid_format(
                "email",
                "domain must contain an interior dot",
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_parses_successfully() {
        let email = EmailAddress::try_new("a@x.com").unwrap();
        assert_eq!(email.as_str(), "a@x.com");
    }

    #[test]
    fn uppercase_input_normalizes_to_lowercase() {
        let email = EmailAddress::try_new("Customer@Example.COM").unwrap();
        assert_eq!(email.as_str(), "customer@example.com");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let email = EmailAddress::try_new("  a@x.com  ").unwrap();
        assert_eq!(email.as_str(), "a@x.com");
    }

    #[test]
    fn empty_email_returns_error() {
        let result = EmailAddress::try_new("");
        assert!(result.is_err());
        match result.unwrap_err() {
            ValidationError::EmptyField { field } => assert_eq!(field, "email"),
            _ => panic!("Expected EmptyField error"),
        }
    }

    #[test]
    fn missing_at_sign_returns_error() {
        assert!(EmailAddress::try_new("not-an-email").is_err());
    }

    #[test]
    fn empty_local_part_returns_error() {
        assert!(EmailAddress::try_new("@example.com").is_err());
    }

    #[test]
    fn empty_domain_returns_error() {
        assert!(EmailAddress::try_new("user@").is_err());
    }

    #[test]
    fn domain_without_dot_returns_error() {
        assert!(EmailAddress::try_new("user@localhost").is_err());
    }

    #[test]
    fn differently_cased_addresses_are_equal() {
        let email1 = EmailAddress::try_new("A@X.com").unwrap();
        let email2 = EmailAddress::try_new("a@x.com").unwrap();
        assert_eq!(email1, email2);
    }

    #[test]
    fn serializes_as_plain_string() {
        let email = EmailAddress::try_new("a@x.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"a@x.com\"");
    }
}
