//! PostgreSQL implementation of PurchaseLedger.
//!
//! The purchases_gateway_payment_id_key partial unique index makes the
//! paid-purchase insert idempotent: a webhook replay inserts zero rows and
//! the caller learns the purchase was already recorded.

use crate::domain::foundation::{
    CustomerId, DomainError, ErrorCode, ProductId, PurchaseId, Timestamp,
};
use crate::domain::order::{Purchase, PurchaseStatus};
use crate::ports::{CreateOutcome, PurchaseLedger};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PurchaseLedger port.
pub struct PostgresPurchaseLedger {
    pool: PgPool,
}

impl PostgresPurchaseLedger {
    /// Creates a new PostgresPurchaseLedger with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a purchase.
#[derive(Debug, sqlx::FromRow)]
#[allow(dead_code)]
struct PurchaseRow {
    id: Uuid,
    customer_id: Uuid,
    product_id: Uuid,
    amount_cents: i64,
    currency: String,
    gateway_payment_id: Option<String>,
    status: String,
    email_sent: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;

        Ok(Purchase {
            id: PurchaseId::from_uuid(row.id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            product_id: ProductId::from_uuid(row.product_id),
            amount_cents: row.amount_cents,
            currency: row.currency,
            gateway_payment_id: row.gateway_payment_id,
            status,
            email_sent: row.email_sent,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PurchaseStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PurchaseStatus::Pending),
        "completed" => Ok(PurchaseStatus::Completed),
        "failed" => Ok(PurchaseStatus::Failed),
        "refunded" => Ok(PurchaseStatus::Refunded),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn status_to_string(status: &PurchaseStatus) -> &'static str {
    match status {
        PurchaseStatus::Pending => "pending",
        PurchaseStatus::Completed => "completed",
        PurchaseStatus::Failed => "failed",
        PurchaseStatus::Refunded => "refunded",
    }
}

#[async_trait]
impl PurchaseLedger for PostgresPurchaseLedger {
    async fn create(&self, purchase: &Purchase) -> Result<CreateOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO purchases (
                id, customer_id, product_id, amount_cents, currency,
                gateway_payment_id, status, email_sent, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (gateway_payment_id) WHERE gateway_payment_id IS NOT NULL
            DO NOTHING
            "#,
        )
        .bind(purchase.id.as_uuid())
        .bind(purchase.customer_id.as_uuid())
        .bind(purchase.product_id.as_uuid())
        .bind(purchase.amount_cents)
        .bind(&purchase.currency)
        .bind(&purchase.gateway_payment_id)
        .bind(status_to_string(&purchase.status))
        .bind(purchase.email_sent)
        .bind(purchase.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to create purchase: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Ok(CreateOutcome::AlreadyRecorded);
        }

        Ok(CreateOutcome::Created)
    }

    async fn mark_email_sent(&self, id: &PurchaseId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE purchases
            SET email_sent = TRUE
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to mark email sent: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PurchaseNotFound,
                "Purchase not found",
            ));
        }

        Ok(())
    }
}
