//! PostgreSQL implementation of CustomerRegistry.
//!
//! Customers are keyed by email. Concurrent find-or-create calls for the
//! same address are resolved by the customers_email_key unique constraint:
//! the insert race loser re-reads the winner's row.

use crate::domain::foundation::{CustomerId, DomainError, ErrorCode, Timestamp};
use crate::domain::order::{Customer, EmailAddress};
use crate::ports::CustomerRegistry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the CustomerRegistry port.
pub struct PostgresCustomerRegistry {
    pool: PgPool,
}

impl PostgresCustomerRegistry {
    /// Creates a new PostgresCustomerRegistry with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, email, gateway_customer_id, created_at
            FROM customers
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find customer: {}", e),
            )
        })?;

        row.map(Customer::try_from).transpose()
    }

    /// Sets the gateway customer id if the row does not have one yet.
    ///
    /// COALESCE keeps an existing id in place, so a second webhook carrying
    /// a different id never overwrites the first.
    async fn backfill_gateway_id(
        &self,
        id: &CustomerId,
        gateway_customer_id: &str,
    ) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            UPDATE customers
            SET gateway_customer_id = COALESCE(gateway_customer_id, $2)
            WHERE id = $1
            RETURNING id, email, gateway_customer_id, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(gateway_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to backfill gateway customer id: {}", e),
            )
        })?;

        row.map(Customer::try_from).transpose()
    }

    async fn insert(&self, customer: &Customer) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, email, gateway_customer_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(customer.email.as_str())
        .bind(&customer.gateway_customer_id)
        .bind(customer.created_at.as_datetime())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Database row representation of a customer.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    email: String,
    gateway_customer_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DomainError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::try_new(&row.email).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid email value: {}", e),
            )
        })?;

        Ok(Customer {
            id: CustomerId::from_uuid(row.id),
            email,
            gateway_customer_id: row.gateway_customer_id,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl CustomerRegistry for PostgresCustomerRegistry {
    async fn find_or_create(
        &self,
        email: &EmailAddress,
        gateway_customer_id: Option<&str>,
    ) -> Result<Customer, DomainError> {
        if let Some(existing) = self.find_by_email(email).await? {
            if let Some(gateway_id) = gateway_customer_id {
                if existing.gateway_customer_id.is_none() {
                    if let Some(updated) = self.backfill_gateway_id(&existing.id, gateway_id).await?
                    {
                        return Ok(updated);
                    }
                }
            }
            return Ok(existing);
        }

        let mut customer = Customer::new(email.clone());
        if let Some(gateway_id) = gateway_customer_id {
            customer.backfill_gateway_id(gateway_id);
        }

        match self.insert(&customer).await {
            Ok(()) => Ok(customer),
            Err(e) => {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.constraint() == Some("customers_email_key") {
                        // Lost an insert race; adopt the winner's row.
                        if let Some(winner) = self.find_by_email(email).await? {
                            if let Some(gateway_id) = gateway_customer_id {
                                if winner.gateway_customer_id.is_none() {
                                    if let Some(updated) =
                                        self.backfill_gateway_id(&winner.id, gateway_id).await?
                                    {
                                        return Ok(updated);
                                    }
                                }
                            }
                            return Ok(winner);
                        }
                    }
                }
                Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to create customer: {}", e),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_valid_email_converts() {
        let row = CustomerRow {
            id: Uuid::new_v4(),
            email: "buyer@example.com".to_string(),
            gateway_customer_id: Some("cus_123".to_string()),
            created_at: Utc::now(),
        };

        let customer = Customer::try_from(row).unwrap();
        assert_eq!(customer.email.as_str(), "buyer@example.com");
        assert_eq!(customer.gateway_customer_id.as_deref(), Some("cus_123"));
    }

    #[test]
    fn row_with_invalid_email_fails_conversion() {
        let row = CustomerRow {
            id: Uuid::new_v4(),
            email: "not-an-email".to_string(),
            gateway_customer_id: None,
            created_at: Utc::now(),
        };

        let result = Customer::try_from(row);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code, ErrorCode::DatabaseError);
    }
}
