//! Resend and delivery email settings.

use serde::Deserialize;

use super::error::ValidationError;

const DEFAULT_FROM_EMAIL: &str = "hello@stillpoint.app";
const DEFAULT_FROM_NAME: &str = "Stillpoint";

/// Outbound email section.
///
/// Leaving `resend_api_key` unset puts delivery in dev mode: the notifier
/// logs what it would have sent instead of calling Resend.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key, `re_...`.
    pub resend_api_key: Option<String>,

    /// Address purchases are announced from.
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// Display name on the From header.
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Prefix for product download links. Without it delivery emails
    /// carry no link.
    pub download_base_url: Option<String>,
}

impl EmailConfig {
    /// True when a Resend API key is present.
    pub fn is_configured(&self) -> bool {
        self.resend_api_key.is_some()
    }

    /// The full From header, `Name <address>`.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.resend_api_key {
            Some(key) if !key.starts_with("re_") => return Err(ValidationError::InvalidResendKey),
            _ => {}
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        match &self.download_base_url {
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                Err(ValidationError::InvalidDownloadBaseUrl)
            }
            _ => Ok(()),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            download_base_url: None,
        }
    }
}

fn default_from_email() -> String {
    DEFAULT_FROM_EMAIL.to_string()
}

fn default_from_name() -> String {
    DEFAULT_FROM_NAME.to_string()
}
