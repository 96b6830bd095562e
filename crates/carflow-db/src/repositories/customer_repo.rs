//! Customer aggregate repository implementation
//!
//! Mirror of the car-side revenue bookkeeping for the requesting customer.

use carflow_core::{models::Customer, traits::CustomerRepository, AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of CustomerRepository
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Create a new customer repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Customer>> {
        debug!("Finding customer by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, CustomerRow>(
            r#"
            SELECT id, ongoing_revenue, total_revenue, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding customer {}: {}", id, e);
            AppError::Database(format!("Failed to find customer: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn add_ongoing_revenue(&self, id: i32, delta: Decimal) -> AppResult<()> {
        debug!("Adjusting ongoing revenue of customer {} by {}", id, delta);

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET ongoing_revenue = ongoing_revenue + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error adjusting customer revenue: {}", e);
            AppError::Database(format!("Failed to adjust customer revenue: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::CustomerNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn settle_revenue(&self, id: i32, accrued: Decimal, settled: Decimal) -> AppResult<()> {
        debug!(
            "Settling revenue of customer {}: ongoing -= {}, total += {}",
            id, accrued, settled
        );

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET ongoing_revenue = ongoing_revenue - $2,
                total_revenue = total_revenue + $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(accrued)
        .bind(settled)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error settling customer revenue: {}", e);
            AppError::Database(format!("Failed to settle customer revenue: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::CustomerNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_revenue(&self, id: i32, ongoing: Decimal, total: Decimal) -> AppResult<()> {
        debug!(
            "Resetting revenue of customer {} to ongoing={}, total={}",
            id, ongoing, total
        );

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET ongoing_revenue = $2,
                total_revenue = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ongoing)
        .bind(total)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error resetting customer revenue: {}", e);
            AppError::Database(format!("Failed to reset customer revenue: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::CustomerNotFound(id));
        }

        Ok(())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    ongoing_revenue: Decimal,
    total_revenue: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            ongoing_revenue: row.ongoing_revenue,
            total_revenue: row.total_revenue,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
