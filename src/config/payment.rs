//! Stripe payment settings.

use serde::Deserialize;

use super::error::ValidationError;

/// Stripe section.
///
/// Both keys are optional: without them the service still runs, free checkout
/// still fulfills, and paid checkout answers "not configured".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Secret API key, `sk_...`.
    pub stripe_api_key: Option<String>,

    /// Webhook signing secret, `whsec_...`.
    pub stripe_webhook_secret: Option<String>,
}

impl PaymentConfig {
    /// True when both the API key and the webhook secret are present.
    pub fn is_configured(&self) -> bool {
        self.stripe_api_key.is_some() && self.stripe_webhook_secret.is_some()
    }

    /// True when the configured key is a test-mode key.
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key
            .as_deref()
            .is_some_and(|k| k.starts_with("sk_test_"))
    }

    /// Key prefixes are checked whenever a key is present. Having exactly one
    /// of the two keys is rejected: checkout would work but webhook
    /// fulfillment could never verify an event.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_some() != self.stripe_webhook_secret.is_some() {
            return Err(ValidationError::IncompleteStripeConfig);
        }
        if let Some(key) = &self.stripe_api_key {
            if !key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }
        if let Some(secret) = &self.stripe_webhook_secret {
            if !secret.starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }
        Ok(())
    }
}
