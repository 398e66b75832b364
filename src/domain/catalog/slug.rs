//! Product slug value object.
//!
//! The slug is the stable external key for a product. It appears in
//! checkout requests, gateway metadata, and success-redirect URLs, so
//! the format is deliberately narrow: lowercase alphanumerics and
//! single hyphens (e.g., "free-pdf", "grounding-protocol").

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// Maximum slug length accepted from any source.
const MAX_SLUG_LEN: usize = 64;

/// A validated product slug.
///
/// # Example
///
/// ```ignore
/// let slug = ProductSlug::try_new("premium-pdf")?;
/// assert_eq!(slug.as_str(), "premium-pdf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductSlug(String);

impl ProductSlug {
    /// Creates a new ProductSlug from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - Slug is empty or longer than 64 characters
    /// - Slug contains characters outside `[a-z0-9-]`
    /// - Slug starts or ends with a hyphen
    pub fn try_new(slug: &str) -> Result<Self, ValidationError> {
        // 1. Check not empty
        if slug.is_empty() {
            return Err(ValidationError::empty_field("product_slug"));
        }

        // 2. Normalize to lowercase
        let normalized = slug.to_lowercase();

        // 3. Check length bound
        if normalized.len() > MAX_SLUG_LEN {
            return Err(ValidationError::out_of_range(
                "product_slug_length",
                1,
                MAX_SLUG_LEN as i64,
                normalized.len() as i64,
            ));
        }

        // 4. Validate character set
        if !normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError::invalid_format(
                "product_slug",
                "lowercase alphanumeric characters and hyphens only",
            ));
        }

        // 5. Hyphens are interior separators only
        if normalized.starts_with('-') || normalized.ends_with('-') {
            return Err(ValidationError::invalid_format(
                "product_slug",
                "must not start or end with a hyphen",
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ProductSlug {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<String> for ProductSlug {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}
