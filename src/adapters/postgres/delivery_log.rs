//! PostgreSQL implementation of DeliveryLog.
//!
//! Append-only writes to the delivery_attempts audit table. Rows are never
//! updated or deleted from this subsystem.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::order::DeliveryAttempt;
use crate::ports::DeliveryLog;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the DeliveryLog port.
pub struct PostgresDeliveryLog {
    pool: PgPool,
}

impl PostgresDeliveryLog {
    /// Creates a new PostgresDeliveryLog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryLog for PostgresDeliveryLog {
    async fn record(&self, attempt: &DeliveryAttempt) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_attempts (
                id, recipient, subject, template, provider_message_id,
                status, error_detail, attempted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(attempt.id.as_uuid())
        .bind(attempt.recipient.as_str())
        .bind(&attempt.subject)
        .bind(attempt.template.as_str())
        .bind(&attempt.provider_message_id)
        .bind(attempt.status.as_str())
        .bind(&attempt.error_detail)
        .bind(attempt.attempted_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record delivery attempt: {}", e),
            )
        })?;

        Ok(())
    }
}
