//! Car aggregate repository implementation
//!
//! Revenue mutations are single-statement additive updates, so per-row
//! serialization comes from the database itself and concurrent transitions
//! cannot lose counts.

use carflow_core::{
    models::{Car, CarAvailability},
    traits::CarRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

const CAR_COLUMNS: &str = r#"
    id, rate_per_day, rate_per_hour,
    ongoing_revenue, total_revenue, availability,
    created_at, updated_at
"#;

/// PostgreSQL implementation of CarRepository
pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    /// Create a new car repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse availability from string
    fn parse_availability(s: &str) -> CarAvailability {
        CarAvailability::from_str(s).unwrap_or(CarAvailability::Available)
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Car>> {
        debug!("Finding car by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, CarRow>(&format!(
            r#"
            SELECT {CAR_COLUMNS}
            FROM cars
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding car {}: {}", id, e);
            AppError::Database(format!("Failed to find car: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Car>> {
        let rows = sqlx::query_as::<sqlx::Postgres, CarRow>(&format!(
            r#"
            SELECT {CAR_COLUMNS}
            FROM cars
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing cars: {}", e);
            AppError::Database(format!("Failed to list cars: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn add_ongoing_revenue(&self, id: i32, delta: Decimal) -> AppResult<()> {
        debug!("Adjusting ongoing revenue of car {} by {}", id, delta);

        let result = sqlx::query(
            r#"
            UPDATE cars
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
            error!("Database error adjusting car revenue: {}", e);
            AppError::Database(format!("Failed to adjust car revenue: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn settle_revenue(&self, id: i32, accrued: Decimal, settled: Decimal) -> AppResult<()> {
        debug!(
            "Settling revenue of car {}: ongoing -= {}, total += {}",
            id, accrued, settled
        );

        let result = sqlx::query(
            r#"
            UPDATE cars
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
            error!("Database error settling car revenue: {}", e);
            AppError::Database(format!("Failed to settle car revenue: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_revenue(&self, id: i32, ongoing: Decimal, total: Decimal) -> AppResult<()> {
        debug!(
            "Resetting revenue of car {} to ongoing={}, total={}",
            id, ongoing, total
        );

        let result = sqlx::query(
            r#"
            UPDATE cars
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
            error!("Database error resetting car revenue: {}", e);
            AppError::Database(format!("Failed to reset car revenue: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_availability(&self, id: i32, availability: CarAvailability) -> AppResult<()> {
        debug!("Marking car {} {}", id, availability);

        let result = sqlx::query(
            r#"
            UPDATE cars
            SET availability = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(availability.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating car availability: {}", e);
            AppError::Database(format!("Failed to update availability: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(id));
        }

        Ok(())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    id: i32,
    rate_per_day: Decimal,
    rate_per_hour: Decimal,
    ongoing_revenue: Decimal,
    total_revenue: Decimal,
    availability: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Self {
            id: row.id,
            rate_per_day: row.rate_per_day,
            rate_per_hour: row.rate_per_hour,
            ongoing_revenue: row.ongoing_revenue,
            total_revenue: row.total_revenue,
            availability: PgCarRepository::parse_availability(&row.availability),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_availability() {
        assert_eq!(
            PgCarRepository::parse_availability("reserved"),
            CarAvailability::Reserved
        );
        assert_eq!(
            PgCarRepository::parse_availability("available"),
            CarAvailability::Available
        );
        assert_eq!(
            PgCarRepository::parse_availability("unknown"),
            CarAvailability::Available
        );
    }
}
