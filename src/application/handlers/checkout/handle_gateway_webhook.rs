//! HandleGatewayWebhookHandler - Command handler for processing payment gateway webhooks.

use std::sync::Arc;

use crate::application::handlers::checkout::DeliverProductHandler;
use crate::domain::catalog::ProductSlug;
use crate::domain::order::{CheckoutError, EmailAddress, Purchase};
use crate::ports::{
    CreateOutcome, CustomerRegistry, PaymentGateway, ProductCatalog, PurchaseLedger, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

/// Command to handle a gateway webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw webhook payload.
    pub payload: Vec<u8>,
    /// Webhook signature header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone)]
pub enum HandleGatewayWebhookResult {
    /// Checkout completed: purchase recorded and delivery attempted.
    Fulfilled {
        purchase_id: String,
        product_slug: String,
        email_delivered: bool,
    },
    /// Replay of an already-recorded payment; nothing was written.
    AlreadyFulfilled,
    /// Payment failure observed and logged; no state change.
    PaymentFailureLogged,
    /// Recognized event acknowledged without fulfillment (missing metadata,
    /// unknown product, or a downstream failure that was logged).
    Acknowledged,
    /// Unknown event type, logged and ignored.
    Ignored,
}

/// Handler for processing payment gateway webhooks.
///
/// Signature verification is the only failure that rejects the request.
/// After that every step is best-effort: fulfillment problems are logged
/// and the event is acknowledged, because the gateway retries non-2xx
/// deliveries indefinitely and a retry would not fix a bad event.
pub struct HandleGatewayWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<dyn ProductCatalog>,
    registry: Arc<dyn CustomerRegistry>,
    ledger: Arc<dyn PurchaseLedger>,
    deliverer: Arc<DeliverProductHandler>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        catalog: Arc<dyn ProductCatalog>,
        registry: Arc<dyn CustomerRegistry>,
        ledger: Arc<dyn PurchaseLedger>,
        deliverer: Arc<DeliverProductHandler>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            registry,
            ledger,
            deliverer,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, CheckoutError> {
        // 1. Verify the signature and parse the event. The only rejection
        //    point: everything before any side effect.
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook signature verification failed");
                CheckoutError::invalid_webhook_signature()
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Processing gateway webhook event"
        );

        // 2. Dispatch by event type
        match &event.event_type {
            WebhookEventType::CheckoutSessionCompleted => {
                Ok(self.fulfill_checkout_completed(&event).await)
            }
            WebhookEventType::PaymentIntentFailed => Ok(self.log_payment_failure(&event)),
            WebhookEventType::Unknown(event_type) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event_type,
                    "Ignoring unhandled webhook event type"
                );
                Ok(HandleGatewayWebhookResult::Ignored)
            }
        }
    }

    /// Fulfillment for a completed checkout session.
    ///
    /// Infallible by construction: every problem is logged and turned into
    /// an acknowledgement so the gateway stops redelivering the event.
    async fn fulfill_checkout_completed(&self, event: &WebhookEvent) -> HandleGatewayWebhookResult {
        // a. Extract what was bought and by whom from the session metadata,
        //    falling back to the gateway-collected email.
        let WebhookEventData::CheckoutCompleted {
            session_id,
            product_slug,
            customer_email,
            gateway_email,
            gateway_customer_id,
            payment_id,
            amount_total_cents,
            currency,
        } = &event.data
        else {
            tracing::error!(
                event_id = %event.id,
                "Unexpected webhook data type for checkout.session.completed"
            );
            return HandleGatewayWebhookResult::Acknowledged;
        };

        let Some(slug_str) = product_slug else {
            tracing::error!(
                event_id = %event.id,
                session_id = %session_id,
                "Webhook session metadata is missing productSlug"
            );
            return HandleGatewayWebhookResult::Acknowledged;
        };
        let slug = match ProductSlug::try_new(slug_str) {
            Ok(slug) => slug,
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    slug = %slug_str,
                    error = %e,
                    "Webhook session metadata carries an invalid productSlug"
                );
                return HandleGatewayWebhookResult::Acknowledged;
            }
        };

        let Some(email_str) = customer_email.as_deref().or(gateway_email.as_deref()) else {
            tracing::error!(
                event_id = %event.id,
                session_id = %session_id,
                "Webhook session has no customer email in metadata or session"
            );
            return HandleGatewayWebhookResult::Acknowledged;
        };
        let email = match EmailAddress::try_new(email_str) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    error = %e,
                    "Webhook session carries an invalid customer email"
                );
                return HandleGatewayWebhookResult::Acknowledged;
            }
        };

        let Some(payment_id) = payment_id else {
            tracing::error!(
                event_id = %event.id,
                session_id = %session_id,
                "Webhook session has no payment id"
            );
            return HandleGatewayWebhookResult::Acknowledged;
        };

        // b. Product lookup
        let product = match self.catalog.find_by_slug(&slug).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                tracing::error!(
                    event_id = %event.id,
                    slug = %slug,
                    "Webhook references an unknown product, nothing to fulfill"
                );
                return HandleGatewayWebhookResult::Acknowledged;
            }
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Product lookup failed");
                return HandleGatewayWebhookResult::Acknowledged;
            }
        };

        // c. Find or create the customer, backfilling the gateway id
        let customer = match self
            .registry
            .find_or_create(&email, gateway_customer_id.as_deref())
            .await
        {
            Ok(customer) => customer,
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Customer upsert failed");
                return HandleGatewayWebhookResult::Acknowledged;
            }
        };

        // d. Record the purchase. The event's total is authoritative; the
        //    catalog price only fills in when the event omits it.
        let amount_cents = amount_total_cents.unwrap_or(product.price_cents);
        let currency = currency.clone().unwrap_or_else(|| product.currency.clone());
        let purchase = match Purchase::completed_paid(
            customer.id,
            product.id,
            amount_cents,
            currency,
            payment_id.clone(),
        ) {
            Ok(purchase) => purchase,
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Webhook purchase data invalid");
                return HandleGatewayWebhookResult::Acknowledged;
            }
        };

        match self.ledger.create(&purchase).await {
            Ok(CreateOutcome::Created) => {}
            Ok(CreateOutcome::AlreadyRecorded) => {
                tracing::info!(
                    event_id = %event.id,
                    payment_id = %payment_id,
                    "Payment already fulfilled, skipping delivery"
                );
                return HandleGatewayWebhookResult::AlreadyFulfilled;
            }
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Purchase insert failed");
                return HandleGatewayWebhookResult::Acknowledged;
            }
        }

        // e. Deliver, then confirm the send on the purchase row
        let outcome = self.deliverer.handle(&customer.email, &product).await;
        if outcome.is_delivered() {
            if let Err(e) = self.ledger.mark_email_sent(&purchase.id).await {
                tracing::error!(
                    purchase_id = %purchase.id,
                    error = %e,
                    "Failed to mark delivery email as sent"
                );
            }
        }

        tracing::info!(
            event_id = %event.id,
            purchase_id = %purchase.id,
            slug = %product.slug,
            delivered = outcome.is_delivered(),
            "Fulfilled paid checkout from webhook"
        );

        HandleGatewayWebhookResult::Fulfilled {
            purchase_id: purchase.id.to_string(),
            product_slug: product.slug.to_string(),
            email_delivered: outcome.is_delivered(),
        }
    }

    /// Records a failed payment in the logs. No purchase state exists yet
    /// for a failed payment, so there is nothing to update.
    fn log_payment_failure(&self, event: &WebhookEvent) -> HandleGatewayWebhookResult {
        match &event.data {
            WebhookEventData::PaymentFailed {
                payment_id,
                failure_message,
            } => {
                tracing::warn!(
                    event_id = %event.id,
                    payment_id = %payment_id,
                    reason = failure_message.as_deref().unwrap_or("unknown"),
                    "Payment failed at the gateway"
                );
            }
            _ => {
                tracing::warn!(
                    event_id = %event.id,
                    "Payment failure event with unexpected data shape"
                );
            }
        }
        HandleGatewayWebhookResult::PaymentFailureLogged
    }
}
