//! DeliverProductHandler - Sends the product-delivery email and records the attempt.

use std::sync::Arc;

use crate::adapters::resend::render_delivery_email;
use crate::domain::catalog::Product;
use crate::domain::order::{DeliveryAttempt, DeliveryOutcome, EmailAddress, EmailTemplate};
use crate::ports::{DeliveryLog, EmailMessage, Mailer};

/// Handler for delivering a purchased product by email.
///
/// Selects the template from the product kind, sends through the configured
/// mailer, and appends one DeliveryAttempt row per call. When no mailer is
/// configured (no email credential), the send is skipped and a `dev` row is
/// written instead, so non-production environments still exercise the full
/// pipeline.
///
/// Delivery failures are data, not errors: every path returns an outcome.
/// An audit-write failure is logged and does not change the outcome.
pub struct DeliverProductHandler {
    mailer: Option<Arc<dyn Mailer>>,
    delivery_log: Arc<dyn DeliveryLog>,
    /// Base URL the downloadable assets are served from, when one exists.
    download_base_url: Option<String>,
}

impl DeliverProductHandler {
    pub fn new(
        mailer: Option<Arc<dyn Mailer>>,
        delivery_log: Arc<dyn DeliveryLog>,
        download_base_url: Option<String>,
    ) -> Self {
        Self {
            mailer,
            delivery_log,
            download_base_url,
        }
    }

    pub async fn handle(&self, recipient: &EmailAddress, product: &Product) -> DeliveryOutcome {
        // 1. Select the template
        let template = if product.is_protocol() {
            EmailTemplate::Protocol
        } else {
            EmailTemplate::Pdf
        };

        // 2. Render subject and body
        let download_url = self.download_url(product);
        let email = render_delivery_email(template, &product.name, download_url.as_deref());

        // 3. Dev mode: no mailer configured, log instead of sending
        let Some(mailer) = &self.mailer else {
            tracing::info!(
                recipient = %recipient,
                product = %product.slug,
                subject = %email.subject,
                "Email provider not configured, logging delivery instead"
            );
            let attempt = DeliveryAttempt::dev(recipient.clone(), email.subject, template);
            self.record(&attempt).await;
            return DeliveryOutcome::DevLogged;
        };

        // 4. Send and record the result
        let message = EmailMessage {
            to: recipient.clone(),
            subject: email.subject.clone(),
            html: email.html,
        };

        match mailer.send(&message).await {
            Ok(sent) => {
                tracing::info!(
                    recipient = %recipient,
                    product = %product.slug,
                    provider_message_id = %sent.provider_message_id,
                    "Delivery email sent"
                );
                let attempt = DeliveryAttempt::sent(
                    recipient.clone(),
                    email.subject,
                    template,
                    sent.provider_message_id.clone(),
                );
                self.record(&attempt).await;
                DeliveryOutcome::Sent {
                    provider_message_id: sent.provider_message_id,
                }
            }
            Err(err) => {
                tracing::error!(
                    recipient = %recipient,
                    product = %product.slug,
                    error = %err,
                    "Delivery email failed"
                );
                let detail = err.to_string();
                let attempt = DeliveryAttempt::failed(
                    recipient.clone(),
                    email.subject,
                    template,
                    detail.clone(),
                );
                self.record(&attempt).await;
                DeliveryOutcome::Failed { detail }
            }
        }
    }

    fn download_url(&self, product: &Product) -> Option<String> {
        let base = self.download_base_url.as_deref()?;
        let path = product.asset_path.as_deref()?;
        Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    async fn record(&self, attempt: &DeliveryAttempt) {
        if let Err(err) = self.delivery_log.record(attempt).await {
            tracing::error!(
                recipient = %attempt.recipient,
                status = %attempt.status,
                error = %err,
                "Failed to record delivery attempt"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDeliveryLog;
    use crate::adapters::resend::MockMailer;
    use crate::domain::catalog::ProductSlug;
    use crate::domain::foundation::ProductId;
    use crate::domain::order::DeliveryStatus;
    use crate::ports::MailerError;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_product(slug: &str) -> Product {
        Product::new(
            ProductId::new(),
            ProductSlug::try_new(slug).unwrap(),
            "Night Practice",
            None,
            900,
            "eur",
            true,
            Some("assets/night-practice.pdf".to_string()),
        )
        .unwrap()
    }

    fn test_recipient() -> EmailAddress {
        EmailAddress::try_new("buyer@example.com").unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn sends_email_and_records_sent_attempt() {
        let mailer = Arc::new(MockMailer::new());
        let log = Arc::new(InMemoryDeliveryLog::new());
        let handler = DeliverProductHandler::new(Some(mailer.clone()), log.clone(), None);

        let outcome = handler.handle(&test_recipient(), &test_product("premium-pdf")).await;

        assert!(matches!(outcome, DeliveryOutcome::Sent { .. }));
        assert!(outcome.is_delivered());
        assert_eq!(mailer.sent_count(), 1);

        let attempts = log.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, DeliveryStatus::Sent);
        assert!(attempts[0].provider_message_id.is_some());
    }

    #[tokio::test]
    async fn selects_protocol_template_for_protocol_products() {
        let mailer = Arc::new(MockMailer::new());
        let log = Arc::new(InMemoryDeliveryLog::new());
        let handler = DeliverProductHandler::new(Some(mailer.clone()), log.clone(), None);

        handler
            .handle(&test_recipient(), &test_product("grounding-protocol"))
            .await;

        assert_eq!(log.attempts()[0].template, EmailTemplate::Protocol);
        assert!(mailer.last_sent().unwrap().subject.contains("is ready"));
    }

    #[tokio::test]
    async fn selects_pdf_template_for_other_products() {
        let mailer = Arc::new(MockMailer::new());
        let log = Arc::new(InMemoryDeliveryLog::new());
        let handler = DeliverProductHandler::new(Some(mailer), log.clone(), None);

        handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;

        assert_eq!(log.attempts()[0].template, EmailTemplate::Pdf);
    }

    #[tokio::test]
    async fn includes_download_link_when_base_url_configured() {
        let mailer = Arc::new(MockMailer::new());
        let log = Arc::new(InMemoryDeliveryLog::new());
        let handler = DeliverProductHandler::new(
            Some(mailer.clone()),
            log,
            Some("https://downloads.stillpoint.example/".to_string()),
        );

        handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;

        let sent = mailer.last_sent().unwrap();
        assert!(sent
            .html
            .contains("https://downloads.stillpoint.example/assets/night-practice.pdf"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Dev Mode Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn dev_mode_skips_send_but_records_attempt() {
        let log = Arc::new(InMemoryDeliveryLog::new());
        let handler = DeliverProductHandler::new(None, log.clone(), None);

        let outcome = handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;

        assert!(matches!(outcome, DeliveryOutcome::DevLogged));
        assert!(outcome.is_delivered());

        let attempts = log.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, DeliveryStatus::Dev);
        assert!(attempts[0].provider_message_id.is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn provider_failure_returns_failed_outcome_with_detail() {
        let mailer = Arc::new(MockMailer::failing(MailerError::provider(
            "Service unavailable",
        )));
        let log = Arc::new(InMemoryDeliveryLog::new());
        let handler = DeliverProductHandler::new(Some(mailer), log.clone(), None);

        let outcome = handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;

        match &outcome {
            DeliveryOutcome::Failed { detail } => assert!(detail.contains("Service unavailable")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!outcome.is_delivered());

        let attempts = log.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, DeliveryStatus::Failed);
        assert!(attempts[0].error_detail.is_some());
    }

    #[tokio::test]
    async fn audit_write_failure_does_not_change_outcome() {
        let mailer = Arc::new(MockMailer::new());
        let log = Arc::new(InMemoryDeliveryLog::new());
        log.set_error(crate::domain::foundation::DomainError::new(
            crate::domain::foundation::ErrorCode::DatabaseError,
            "insert failed",
        ));
        let handler = DeliverProductHandler::new(Some(mailer), log.clone(), None);

        let outcome = handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;

        assert!(matches!(outcome, DeliveryOutcome::Sent { .. }));
        assert_eq!(log.attempt_count(), 0);
    }

    #[tokio::test]
    async fn every_path_records_exactly_one_attempt() {
        let log = Arc::new(InMemoryDeliveryLog::new());

        // Sent path
        let sent_handler =
            DeliverProductHandler::new(Some(Arc::new(MockMailer::new())), log.clone(), None);
        sent_handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;
        assert_eq!(log.attempt_count(), 1);

        // Failed path
        let failed_handler = DeliverProductHandler::new(
            Some(Arc::new(MockMailer::failing(MailerError::provider("down")))),
            log.clone(),
            None,
        );
        failed_handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;
        assert_eq!(log.attempt_count(), 2);

        // Dev path
        let dev_handler = DeliverProductHandler::new(None, log.clone(), None);
        dev_handler
            .handle(&test_recipient(), &test_product("premium-pdf"))
            .await;
        assert_eq!(log.attempt_count(), 3);
    }
}
