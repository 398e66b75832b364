//! Customer identity record.

use crate::domain::foundation::{CustomerId, Timestamp};
use serde::{Deserialize, Serialize};

use super::EmailAddress;

/// A customer known to the order pipeline.
///
/// Created lazily on first purchase (free or paid), keyed by email.
/// The gateway customer id is backfilled in place when a paid purchase
/// reveals one the record did not have. Customers are never deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier for this customer.
    pub id: CustomerId,

    /// Email address, the unique natural key.
    pub email: EmailAddress,

    /// Payment gateway customer id, once a paid purchase reveals one.
    pub gateway_customer_id: Option<String>,

    /// When the customer record was first created.
    pub created_at: Timestamp,
}

impl Customer {
    /// Creates a new customer record for the given email.
    pub fn new(email: EmailAddress) -> Self {
        Self {
            id: CustomerId::new(),
            email,
            gateway_customer_id: None,
            created_at: Timestamp::now(),
        }
    }

    /// Records a gateway customer id if none is known yet.
    ///
    /// Returns true if the id was adopted, false if one was already set.
    /// A known id is never overwritten.
    pub fn backfill_gateway_id(&mut self, gateway_customer_id: impl Into<String>) -> bool {
        if self.gateway_customer_id.is_some() {
            return false;
        }
        self.gateway_customer_id = Some(gateway_customer_id.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_email() -> EmailAddress {
        EmailAddress::try_new("a@x.com").unwrap()
    }

    #[test]
    fn new_customer_has_no_gateway_id() {
        let customer = Customer::new(test_email());
        assert!(customer.gateway_customer_id.is_none());
        assert_eq!(customer.email.as_str(), "a@x.com");
    }

    #[test]
    fn backfill_adopts_first_gateway_id() {
        let mut customer = Customer::new(test_email());
        assert!(customer.backfill_gateway_id("cus_123"));
        assert_eq!(customer.gateway_customer_id.as_deref(), Some("cus_123"));
    }

    #[test]
    fn backfill_never_overwrites_existing_id() {
        let mut customer = Customer::new(test_email());
        customer.backfill_gateway_id("cus_first");
        assert!(!customer.backfill_gateway_id("cus_second"));
        assert_eq!(customer.gateway_customer_id.as_deref(), Some("cus_first"));
    }

    #[test]
    fn customers_get_unique_ids() {
        let a = Customer::new(test_email());
        let b = Customer::new(test_email());
        assert_ne!(a.id, b.id);
    }
}
