//! Errors raised while loading or validating configuration.

use thiserror::Error;

/// Startup aborts with one of these when the environment is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration from the environment: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A specific setting that failed semantic validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("required setting {0} is missing")]
    MissingRequired(&'static str),

    // Server
    #[error("server port must be nonzero")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    // Database
    #[error("database url must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("database pool larger than 100 connections")]
    PoolSizeTooLarge,

    // Stripe
    #[error("stripe api key does not start with sk_")]
    InvalidStripeKey,

    #[error("stripe webhook secret does not start with whsec_")]
    InvalidStripeWebhookSecret,

    #[error("stripe needs both the api key and the webhook secret, got one")]
    IncompleteStripeConfig,

    // Resend
    #[error("resend api key does not start with re_")]
    InvalidResendKey,

    #[error("from email is not an email address")]
    InvalidFromEmail,

    #[error("download base url must be http(s)")]
    InvalidDownloadBaseUrl,
}
