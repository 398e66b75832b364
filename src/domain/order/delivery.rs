//! Delivery attempt audit records.
//!
//! Every attempt to send a product-delivery email writes exactly one
//! append-only DeliveryAttempt row, whatever the outcome. Dev mode (no
//! email credential configured) is a distinct status so local and staging
//! runs exercise the full pipeline without sending real mail.

use crate::domain::foundation::{DeliveryAttemptId, Timestamp};
use serde::{Deserialize, Serialize};

use super::EmailAddress;

/// Which HTML template a delivery email used.
///
/// A two-way branch, not a template engine: protocol products get the
/// guided-protocol email, everything else the generic PDF email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailTemplate {
    /// Guided somatic-practice protocol delivery.
    Protocol,

    /// Generic downloadable PDF delivery.
    Pdf,
}

impl EmailTemplate {
    /// Returns the stored identifier for this template.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::Protocol => "protocol",
            EmailTemplate::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for EmailTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome status of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// The provider accepted the email.
    Sent,

    /// The provider rejected the email or the call failed.
    Failed,

    /// No provider configured; logged instead of sent.
    Dev,
}

impl DeliveryStatus {
    /// Returns the stored identifier for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Dev => "dev",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One append-only audit row per delivery attempt, including retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    /// Unique identifier for this attempt.
    pub id: DeliveryAttemptId,

    /// Recipient email address.
    pub recipient: EmailAddress,

    /// Subject line that was (or would have been) sent.
    pub subject: String,

    /// Template used for the email body.
    pub template: EmailTemplate,

    /// Provider message id on success, None otherwise.
    pub provider_message_id: Option<String>,

    /// Outcome of the attempt.
    pub status: DeliveryStatus,

    /// Provider or transport error detail for failed attempts.
    pub error_detail: Option<String>,

    /// When the attempt happened.
    pub attempted_at: Timestamp,
}

impl DeliveryAttempt {
    /// Records a successful send.
    pub fn sent(
        recipient: EmailAddress,
        subject: impl Into<String>,
        template: EmailTemplate,
        provider_message_id: impl Into<String>,
    ) -> Self {
        Self {
            id: DeliveryAttemptId::new(),
            recipient,
            subject: subject.into(),
            template,
            provider_message_id: Some(provider_message_id.into()),
            status: DeliveryStatus::Sent,
            error_detail: None,
            attempted_at: Timestamp::now(),
        }
    }

    /// Records a failed send with the provider's error detail.
    pub fn failed(
        recipient: EmailAddress,
        subject: impl Into<String>,
        template: EmailTemplate,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            id: DeliveryAttemptId::new(),
            recipient,
            subject: subject.into(),
            template,
            provider_message_id: None,
            status: DeliveryStatus::Failed,
            error_detail: Some(error_detail.into()),
            attempted_at: Timestamp::now(),
        }
    }

    /// Records a dev-mode attempt (no provider configured, nothing sent).
    pub fn dev(
        recipient: EmailAddress,
        subject: impl Into<String>,
        template: EmailTemplate,
    ) -> Self {
        Self {
            id: DeliveryAttemptId::new(),
            recipient,
            subject: subject.into(),
            template,
            provider_message_id: None,
            status: DeliveryStatus::Dev,
            error_detail: None,
            attempted_at: Timestamp::now(),
        }
    }
}

/// Result of one Delivery Notifier call, as seen by orchestrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The provider accepted the email.
    Sent { provider_message_id: String },

    /// Dev mode: nothing sent, attempt logged.
    DevLogged,

    /// The send failed; the purchase stays completed regardless.
    Failed { detail: String },
}

impl DeliveryOutcome {
    /// Returns true if the purchase's email_sent flag should be set.
    ///
    /// Dev mode counts as delivered so non-production environments
    /// exercise the follow-up write too.
    pub fn is_delivered(&self) -> bool {
        matches!(
            self,
            DeliveryOutcome::Sent { .. } | DeliveryOutcome::DevLogged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_email() -> EmailAddress {
        EmailAddress::try_new("a@x.com").unwrap()
    }

    #[test]
    fn sent_attempt_records_provider_message_id() {
        let attempt = DeliveryAttempt::sent(
            test_email(),
            "Your download",
            EmailTemplate::Pdf,
            "msg_123",
        );
        assert_eq!(attempt.status, DeliveryStatus::Sent);
        assert_eq!(attempt.provider_message_id.as_deref(), Some("msg_123"));
        assert!(attempt.error_detail.is_none());
    }

    #[test]
    fn failed_attempt_records_error_detail() {
        let attempt = DeliveryAttempt::failed(
            test_email(),
            "Your download",
            EmailTemplate::Protocol,
            "provider returned 503",
        );
        assert_eq!(attempt.status, DeliveryStatus::Failed);
        assert!(attempt.provider_message_id.is_none());
        assert_eq!(
            attempt.error_detail.as_deref(),
            Some("provider returned 503")
        );
    }

    #[test]
    fn dev_attempt_has_neither_message_id_nor_error() {
        let attempt = DeliveryAttempt::dev(test_email(), "Your download", EmailTemplate::Pdf);
        assert_eq!(attempt.status, DeliveryStatus::Dev);
        assert!(attempt.provider_message_id.is_none());
        assert!(attempt.error_detail.is_none());
    }

    #[test]
    fn sent_and_dev_outcomes_count_as_delivered() {
        assert!(DeliveryOutcome::Sent {
            provider_message_id: "msg_1".to_string()
        }
        .is_delivered());
        assert!(DeliveryOutcome::DevLogged.is_delivered());
    }

    #[test]
    fn failed_outcome_does_not_count_as_delivered() {
        assert!(!DeliveryOutcome::Failed {
            detail: "timeout".to_string()
        }
        .is_delivered());
    }

    #[test]
    fn template_identifiers_are_stable() {
        assert_eq!(EmailTemplate::Protocol.as_str(), "protocol");
        assert_eq!(EmailTemplate::Pdf.as_str(), "pdf");
    }

    #[test]
    fn status_identifiers_are_stable() {
        assert_eq!(DeliveryStatus::Sent.as_str(), "sent");
        assert_eq!(DeliveryStatus::Failed.as_str(), "failed");
        assert_eq!(DeliveryStatus::Dev.as_str(), "dev");
    }
}
