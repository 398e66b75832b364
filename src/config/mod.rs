//! Typed configuration, loaded from the environment.
//!
//! Settings come in through `STILLPOINT__`-prefixed environment variables
//! (with `__` separating nesting levels) via the `config` crate; a local
//! `.env` file is honored for development through `dotenvy`. Only the
//! database section is required. Payment and email stay unconfigured when
//! their keys are absent, and the checkout API degrades accordingly.
//!
//! ```no_run
//! use stillpoint::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod email;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root of the configuration tree.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address and runtime environment.
    #[serde(default)]
    pub server: ServerConfig,

    /// Postgres connection settings. The only required section.
    pub database: DatabaseConfig,

    /// Stripe keys, absent until configured.
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Resend keys, absent until configured.
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Reads `.env` (when present) and the process environment, then
    /// deserializes the `STILLPOINT__*` variables into the typed tree.
    ///
    /// `STILLPOINT__SERVER__PORT=8080` becomes `server.port`,
    /// `STILLPOINT__DATABASE__URL=...` becomes `database.url`, and so on.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STILLPOINT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation across all sections, run once at startup after
    /// [`AppConfig::load`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.email.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
