//! In-memory store implementations for testing.
//!
//! Deterministic substitutes for the PostgreSQL adapters, with the same
//! observable semantics: slug lookups skip inactive products, customer
//! find-or-create is keyed on email, and paid-purchase inserts are
//! idempotent on the gateway payment id.
//!
//! # Security Note
//!
//! These adapters are for **testing only** and should not be used in
//! production. They use `.expect()` on lock operations which will panic if
//! locks are poisoned.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use crate::domain::catalog::{Product, ProductSlug};
use crate::domain::foundation::{DomainError, ErrorCode, PurchaseId};
use crate::domain::order::{Customer, DeliveryAttempt, EmailAddress, Purchase};
use crate::ports::{CreateOutcome, CustomerRegistry, DeliveryLog, ProductCatalog, PurchaseLedger};

/// In-memory product catalog for testing.
#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<Vec<Product>>,
    next_error: Mutex<Option<DomainError>>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-seeded with products.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
            next_error: Mutex::new(None),
        }
    }

    /// Adds a product to the catalog.
    pub fn add_product(&self, product: Product) {
        self.products
            .write()
            .expect("InMemoryProductCatalog: products lock poisoned")
            .push(product);
    }

    /// Sets an error returned by the next call. Consumed once.
    pub fn set_error(&self, error: DomainError) {
        *self
            .next_error
            .lock()
            .expect("InMemoryProductCatalog: error lock poisoned") = Some(error);
    }

    fn check_error(&self) -> Result<(), DomainError> {
        if let Some(err) = self
            .next_error
            .lock()
            .expect("InMemoryProductCatalog: error lock poisoned")
            .take()
        {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_by_slug(&self, slug: &ProductSlug) -> Result<Option<Product>, DomainError> {
        self.check_error()?;
        let products = self
            .products
            .read()
            .expect("InMemoryProductCatalog: products lock poisoned");
        Ok(products
            .iter()
            .find(|p| &p.slug == slug && p.active)
            .cloned())
    }
}

/// In-memory customer registry for testing.
#[derive(Default)]
pub struct InMemoryCustomerRegistry {
    customers: RwLock<Vec<Customer>>,
    next_error: Mutex<Option<DomainError>>,
}

impl InMemoryCustomerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an error returned by the next call. Consumed once.
    pub fn set_error(&self, error: DomainError) {
        *self
            .next_error
            .lock()
            .expect("InMemoryCustomerRegistry: error lock poisoned") = Some(error);
    }

    // === Test Helpers ===

    /// Returns all customers (for test assertions).
    pub fn customers(&self) -> Vec<Customer> {
        self.customers
            .read()
            .expect("InMemoryCustomerRegistry: customers lock poisoned")
            .clone()
    }

    /// Returns count of customers.
    pub fn customer_count(&self) -> usize {
        self.customers
            .read()
            .expect("InMemoryCustomerRegistry: customers lock poisoned")
            .len()
    }

    fn check_error(&self) -> Result<(), DomainError> {
        if let Some(err) = self
            .next_error
            .lock()
            .expect("InMemoryCustomerRegistry: error lock poisoned")
            .take()
        {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerRegistry for InMemoryCustomerRegistry {
    async fn find_or_create(
        &self,
        email: &EmailAddress,
        gateway_customer_id: Option<&str>,
    ) -> Result<Customer, DomainError> {
        self.check_error()?;
        let mut customers = self
            .customers
            .write()
            .expect("InMemoryCustomerRegistry: customers lock poisoned");

        if let Some(existing) = customers.iter_mut().find(|c| &c.email == email) {
            if let Some(gateway_id) = gateway_customer_id {
                existing.backfill_gateway_id(gateway_id);
            }
            return Ok(existing.clone());
        }

        let mut customer = Customer::new(email.clone());
        if let Some(gateway_id) = gateway_customer_id {
            customer.backfill_gateway_id(gateway_id);
        }
        customers.push(customer.clone());
        Ok(customer)
    }
}

/// In-memory purchase ledger for testing.
///
/// Mirrors the partial unique index on gateway_payment_id: inserting a paid
/// purchase whose payment id is already present reports `AlreadyRecorded`
/// and leaves the stored row untouched. Free purchases always insert.
#[derive(Default)]
pub struct InMemoryPurchaseLedger {
    purchases: RwLock<Vec<Purchase>>,
    next_error: Mutex<Option<DomainError>>,
    method_errors: Mutex<HashMap<String, DomainError>>,
}

impl InMemoryPurchaseLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an error returned by the next call to any method. Consumed once.
    pub fn set_error(&self, error: DomainError) {
        *self
            .next_error
            .lock()
            .expect("InMemoryPurchaseLedger: error lock poisoned") = Some(error);
    }

    /// Sets an error returned whenever the named method is called.
    pub fn set_method_error(&self, method: &str, error: DomainError) {
        self.method_errors
            .lock()
            .expect("InMemoryPurchaseLedger: method error lock poisoned")
            .insert(method.to_string(), error);
    }

    // === Test Helpers ===

    /// Returns all purchases (for test assertions).
    pub fn purchases(&self) -> Vec<Purchase> {
        self.purchases
            .read()
            .expect("InMemoryPurchaseLedger: purchases lock poisoned")
            .clone()
    }

    /// Returns count of purchases.
    pub fn purchase_count(&self) -> usize {
        self.purchases
            .read()
            .expect("InMemoryPurchaseLedger: purchases lock poisoned")
            .len()
    }

    fn check_error(&self, method: &str) -> Result<(), DomainError> {
        if let Some(err) = self
            .method_errors
            .lock()
            .expect("InMemoryPurchaseLedger: method error lock poisoned")
            .get(method)
        {
            return Err(err.clone());
        }
        if let Some(err) = self
            .next_error
            .lock()
            .expect("InMemoryPurchaseLedger: error lock poisoned")
            .take()
        {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl PurchaseLedger for InMemoryPurchaseLedger {
    async fn create(&self, purchase: &Purchase) -> Result<CreateOutcome, DomainError> {
        self.check_error("create")?;
        let mut purchases = self
            .purchases
            .write()
            .expect("InMemoryPurchaseLedger: purchases lock poisoned");

        if let Some(payment_id) = &purchase.gateway_payment_id {
            let duplicate = purchases
                .iter()
                .any(|p| p.gateway_payment_id.as_deref() == Some(payment_id.as_str()));
            if duplicate {
                return Ok(CreateOutcome::AlreadyRecorded);
            }
        }

        purchases.push(purchase.clone());
        Ok(CreateOutcome::Created)
    }

    async fn mark_email_sent(&self, id: &PurchaseId) -> Result<(), DomainError> {
        self.check_error("mark_email_sent")?;
        let mut purchases = self
            .purchases
            .write()
            .expect("InMemoryPurchaseLedger: purchases lock poisoned");

        match purchases.iter_mut().find(|p| &p.id == id) {
            Some(purchase) => {
                purchase.mark_email_sent();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::PurchaseNotFound,
                "Purchase not found",
            )),
        }
    }
}

/// In-memory delivery log for testing.
#[derive(Default)]
pub struct InMemoryDeliveryLog {
    attempts: RwLock<Vec<DeliveryAttempt>>,
    next_error: Mutex<Option<DomainError>>,
}

impl InMemoryDeliveryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an error returned by the next call. Consumed once.
    pub fn set_error(&self, error: DomainError) {
        *self
            .next_error
            .lock()
            .expect("InMemoryDeliveryLog: error lock poisoned") = Some(error);
    }

    // === Test Helpers ===

    /// Returns all recorded attempts (for test assertions).
    pub fn attempts(&self) -> Vec<DeliveryAttempt> {
        self.attempts
            .read()
            .expect("InMemoryDeliveryLog: attempts lock poisoned")
            .clone()
    }

    /// Returns count of recorded attempts.
    pub fn attempt_count(&self) -> usize {
        self.attempts
            .read()
            .expect("InMemoryDeliveryLog: attempts lock poisoned")
            .len()
    }

    fn check_error(&self) -> Result<(), DomainError> {
        if let Some(err) = self
            .next_error
            .lock()
            .expect("InMemoryDeliveryLog: error lock poisoned")
            .take()
        {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl DeliveryLog for InMemoryDeliveryLog {
    async fn record(&self, attempt: &DeliveryAttempt) -> Result<(), DomainError> {
        self.check_error()?;
        self.attempts
            .write()
            .expect("InMemoryDeliveryLog: attempts lock poisoned")
            .push(attempt.clone());
        Ok(())
    }
}
