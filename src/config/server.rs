//! HTTP server settings.

use serde::Deserialize;
use std::net::SocketAddr;

use super::error::ValidationError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_FILTER: &str = "info,stillpoint=debug,sqlx=warn";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Bind address, environment, and request handling limits.
///
/// Every field has a default, so the whole section may be omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Which deployment this process serves.
    #[serde(default)]
    pub environment: Environment,

    /// `tracing_subscriber` filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Budget for a single request before the timeout layer cancels it.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated origins allowed by CORS. Unset means none.
    pub cors_origins: Option<String>,
}

/// Deployment environment the process runs in.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// The address to hand to the listener.
    ///
    /// Panics on a malformed host; `validate` runs before this at startup.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("host and port do not form a socket address")
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// The CORS origins, split and trimmed.
    pub fn cors_origins_list(&self) -> Vec<String> {
        match &self.cors_origins {
            Some(raw) => raw.split(',').map(|o| o.trim().to_string()).collect(),
            None => Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            environment: Environment::default(),
            log_level: DEFAULT_LOG_FILTER.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
