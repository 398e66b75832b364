//! StartCheckoutHandler - Command handler for starting a product checkout.

use std::sync::Arc;

use crate::application::handlers::checkout::DeliverProductHandler;
use crate::domain::catalog::ProductSlug;
use crate::domain::order::{CheckoutError, EmailAddress, Purchase};
use crate::ports::{
    CreateCheckoutRequest, CustomerRegistry, PaymentGateway, ProductCatalog, PurchaseLedger,
};

/// Command to start a checkout for one product.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub product_slug: ProductSlug,
    pub email: EmailAddress,
    pub success_url: String,
    pub cancel_url: String,
}

/// Result of a checkout start.
///
/// Not-found and not-configured are legitimate outcomes of the operation,
/// not errors; errors are reserved for gateway and store failures.
#[derive(Debug, Clone)]
pub enum StartCheckoutResult {
    /// Send the caller to this URL.
    ///
    /// For free products this is the success URL (fulfillment already
    /// happened); for paid products it is the gateway's hosted checkout page.
    Redirect { url: String },
    /// Product unknown or inactive.
    ProductNotFound { slug: ProductSlug },
    /// Paid product, but no payment gateway credential is configured.
    GatewayNotConfigured,
}

/// Handler for starting a checkout.
///
/// Free products are fulfilled synchronously: customer, purchase, and
/// delivery email all happen before the response. Paid products only get a
/// hosted checkout session; the purchase is recorded later when the webhook
/// confirms payment, so abandoned checkouts leave no rows behind.
pub struct StartCheckoutHandler {
    catalog: Arc<dyn ProductCatalog>,
    registry: Arc<dyn CustomerRegistry>,
    ledger: Arc<dyn PurchaseLedger>,
    deliverer: Arc<DeliverProductHandler>,
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl StartCheckoutHandler {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        registry: Arc<dyn CustomerRegistry>,
        ledger: Arc<dyn PurchaseLedger>,
        deliverer: Arc<DeliverProductHandler>,
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        Self {
            catalog,
            registry,
            ledger,
            deliverer,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<StartCheckoutResult, CheckoutError> {
        // 1. Look up the product
        let Some(product) = self.catalog.find_by_slug(&cmd.product_slug).await? else {
            tracing::info!(slug = %cmd.product_slug, "Checkout requested for unknown product");
            return Ok(StartCheckoutResult::ProductNotFound {
                slug: cmd.product_slug,
            });
        };

        // 2. Branch on price
        if product.is_free() {
            return self.fulfill_free(cmd, &product).await;
        }

        // 3. Paid path needs a configured gateway
        let Some(gateway) = &self.gateway else {
            tracing::warn!(
                slug = %cmd.product_slug,
                "Paid checkout requested but no payment gateway is configured"
            );
            return Ok(StartCheckoutResult::GatewayNotConfigured);
        };

        // 4. Create the hosted checkout session. No purchase row yet; the
        //    webhook records it once payment is confirmed.
        let session = gateway
            .create_checkout_session(CreateCheckoutRequest {
                product_slug: product.slug.clone(),
                product_name: product.name.clone(),
                product_description: product.description.clone(),
                unit_amount_cents: product.price_cents,
                currency: product.currency.clone(),
                customer_email: cmd.email,
                success_url: cmd.success_url,
                cancel_url: cmd.cancel_url,
            })
            .await?;

        tracing::info!(
            slug = %product.slug,
            session_id = %session.id,
            "Created gateway checkout session"
        );

        Ok(StartCheckoutResult::Redirect { url: session.url })
    }

    /// Synchronous fulfillment for a free product.
    async fn fulfill_free(
        &self,
        cmd: StartCheckoutCommand,
        product: &crate::domain::catalog::Product,
    ) -> Result<StartCheckoutResult, CheckoutError> {
        // 1. Find or create the customer
        let customer = self.registry.find_or_create(&cmd.email, None).await?;

        // 2. Record the completed purchase
        let purchase = Purchase::completed_free(customer.id, product.id, product.currency.clone());
        self.ledger.create(&purchase).await?;

        // 3. Deliver, then confirm the send on the purchase row
        let outcome = self.deliverer.handle(&customer.email, product).await;
        if outcome.is_delivered() {
            // The purchase stays completed even if this write fails; a
            // retried checkout would create a second free purchase.
            if let Err(err) = self.ledger.mark_email_sent(&purchase.id).await {
                tracing::error!(
                    purchase_id = %purchase.id,
                    error = %err,
                    "Failed to mark delivery email as sent"
                );
            }
        }

        tracing::info!(
            slug = %product.slug,
            purchase_id = %purchase.id,
            delivered = outcome.is_delivered(),
            "Fulfilled free checkout"
        );

        // 4. Hand back the caller's success page
        let url = format!("{}?product={}", cmd.success_url, product.slug);
        Ok(StartCheckoutResult::Redirect { url })
    }
}
