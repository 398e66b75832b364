//! Resend mailer - Implementation of `Mailer` for Resend's email API.
//!
//! Sends transactional email via a single JSON POST to `/emails`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ResendConfig::new(api_key, "Stillpoint <hello@stillpoint.example>");
//!
//! let mailer = ResendMailer::new(config);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ports::{EmailMessage, Mailer, MailerError, SentEmail};

/// Configuration for the Resend mailer.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// API key for authentication.
    api_key: SecretString,
    /// Sender shown on outgoing mail, e.g. "Stillpoint <hello@stillpoint.example>".
    pub from_address: String,
    /// Base URL for the API (default: https://api.resend.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ResendConfig {
    /// Creates a new configuration with the given API key and sender.
    pub fn new(api_key: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            from_address: from_address.into(),
            base_url: "https://api.resend.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL (for testing against a local server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Resend API mailer implementation.
pub struct ResendMailer {
    config: ResendConfig,
    client: Client,
}

impl ResendMailer {
    /// Creates a new Resend mailer with the given configuration.
    pub fn new(config: ResendConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the send endpoint URL.
    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.base_url)
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailerError> {
        let request = ResendSendRequest {
            from: self.config.from_address.clone(),
            to: vec![message.to.to_string()],
            subject: message.subject.clone(),
            html: message.html.clone(),
        };

        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(self.config.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailerError::network(format!(
                        "Request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    MailerError::network(format!("Connection failed: {e}"))
                } else {
                    MailerError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                "Resend API returned an error"
            );
            return Err(match status.as_u16() {
                401 | 403 => MailerError::authentication("Resend rejected the API key"),
                400 | 422 => MailerError::rejected(format!("Resend rejected the message: {body}")),
                _ => MailerError::provider(format!("Resend error {status}: {body}")),
            });
        }

        let sent: ResendSendResponse = response.json().await.map_err(|e| {
            MailerError::provider(format!("Failed to parse Resend response: {e}"))
        })?;

        tracing::info!(
            provider_message_id = %sent.id,
            subject = %message.subject,
            "Email accepted by Resend"
        );

        Ok(SentEmail {
            provider_message_id: sent.id,
        })
    }
}

// ----- Resend API Types -----

#[derive(Debug, Serialize)]
struct ResendSendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

#[derive(Debug, Deserialize)]
struct ResendSendResponse {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_works() {
        let config = ResendConfig::new("re_test_key", "Stillpoint <hello@stillpoint.example>")
            .with_base_url("http://localhost:8099")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.from_address, "Stillpoint <hello@stillpoint.example>");
        assert_eq!(config.base_url, "http://localhost:8099");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.api_key(), "re_test_key");
    }

    #[test]
    fn config_debug_does_not_leak_api_key() {
        let config = ResendConfig::new("re_secret_value", "hello@stillpoint.example");
        let debug = format!("{config:?}");
        assert!(!debug.contains("re_secret_value"));
    }

    #[test]
    fn emails_url_appends_path() {
        let config = ResendConfig::new("re_test", "hello@stillpoint.example")
            .with_base_url("http://localhost:8099");
        let mailer = ResendMailer::new(config);
        assert_eq!(mailer.emails_url(), "http://localhost:8099/emails");
    }

    #[test]
    fn send_request_serializes_to_resend_shape() {
        let request = ResendSendRequest {
            from: "Stillpoint <hello@stillpoint.example>".to_string(),
            to: vec!["buyer@example.com".to_string()],
            subject: "Your download".to_string(),
            html: "<p>Hi</p>".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["from"], "Stillpoint <hello@stillpoint.example>");
        assert_eq!(json["to"][0], "buyer@example.com");
        assert_eq!(json["subject"], "Your download");
        assert_eq!(json["html"], "<p>Hi</p>");
    }

    #[test]
    fn send_response_parses_message_id() {
        let response: ResendSendResponse =
            serde_json::from_str(r#"{"id": "49a3999c-0ce1-4ea6-ab68-afcd6dc2e98d"}"#).unwrap();
        assert_eq!(response.id, "49a3999c-0ce1-4ea6-ab68-afcd6dc2e98d");
    }
}
