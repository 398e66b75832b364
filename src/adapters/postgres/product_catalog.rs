//! PostgreSQL implementation of ProductCatalog.
//!
//! Read-only lookups against the products table.

use crate::domain::catalog::{Product, ProductSlug};
use crate::domain::foundation::{DomainError, ErrorCode, ProductId, Timestamp};
use crate::ports::ProductCatalog;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the ProductCatalog port.
pub struct PostgresProductCatalog {
    pool: PgPool,
}

impl PostgresProductCatalog {
    /// Creates a new PostgresProductCatalog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a product.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    slug: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    currency: String,
    active: bool,
    asset_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = ProductSlug::try_new(&row.slug).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid slug value: {}", e),
            )
        })?;

        Ok(Product {
            id: ProductId::from_uuid(row.id),
            slug,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            currency: row.currency,
            active: row.active,
            asset_path: row.asset_path,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    async fn find_by_slug(&self, slug: &ProductSlug) -> Result<Option<Product>, DomainError> {
        // Inactive products are filtered here so callers see them as absent.
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, slug, name, description, price_cents, currency, active,
                   asset_path, created_at
            FROM products
            WHERE slug = $1 AND active = TRUE
            "#,
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find product: {}", e),
            )
        })?;

        row.map(Product::try_from).transpose()
    }
}
