//! Booking repository implementation
//!
//! Provides PostgreSQL-backed storage for bookings. Updates are
//! version-checked: the row is only written when it still carries the
//! version the caller loaded, so concurrent transitions surface as
//! `ConcurrencyConflict` instead of silently overwriting each other.

use carflow_core::{
    models::{Booking, BookingAction, BookingStateFilter, BookingStatus, PriceMode},
    traits::BookingRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const BOOKING_COLUMNS: &str = r#"
    id, car_id, customer_id, requested_at,
    window_start, window_end, price_mode,
    duration_units, total_price,
    action, status,
    returned_at, overdue_units, overdue_amount,
    version, updated_at
"#;

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse booking status from string
    fn parse_status(s: &str) -> BookingStatus {
        BookingStatus::from_str(s).unwrap_or(BookingStatus::Pending)
    }

    /// Parse booking action from string
    fn parse_action(s: &str) -> BookingAction {
        BookingAction::from_str(s).unwrap_or(BookingAction::Pending)
    }

    /// Parse price mode from string
    fn parse_mode(s: &str) -> PriceMode {
        PriceMode::from_str(s).unwrap_or(PriceMode::PerDay)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self, booking))]
    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        debug!("Creating booking {} for car {}", booking.id, booking.car_id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (
                id, car_id, customer_id, requested_at,
                window_start, window_end, price_mode,
                duration_units, total_price,
                action, status,
                returned_at, overdue_units, overdue_amount,
                version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(booking.car_id)
        .bind(booking.customer_id)
        .bind(booking.requested_at)
        .bind(booking.window_start)
        .bind(booking.window_end)
        .bind(booking.price_mode.to_string())
        .bind(booking.duration_units)
        .bind(booking.total_price)
        .bind(booking.action.to_string())
        .bind(booking.status.to_string())
        .bind(booking.returned_at)
        .bind(booking.overdue_units)
        .bind(booking.overdue_amount)
        .bind(booking.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating booking: {}", e);
            AppError::Database(format!("Failed to create booking: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, booking))]
    async fn update(&self, booking: &Booking) -> AppResult<Booking> {
        debug!(
            "Updating booking {} at version {}",
            booking.id, booking.version
        );

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET action = $3,
                status = $4,
                returned_at = $5,
                overdue_units = $6,
                overdue_amount = $7,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(booking.version)
        .bind(booking.action.to_string())
        .bind(booking.status.to_string())
        .bind(booking.returned_at)
        .bind(booking.overdue_units)
        .bind(booking.overdue_amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating booking {}: {}", booking.id, e);
            AppError::Database(format!("Failed to update booking: {}", e))
        })?;

        row.map(Into::into).ok_or_else(|| {
            AppError::ConcurrencyConflict(format!(
                "booking {} was modified concurrently (stale version {})",
                booking.id, booking.version
            ))
        })
    }

    #[instrument(skip(self))]
    async fn list_active_for_car(&self, car_id: i32) -> AppResult<Vec<Booking>> {
        debug!("Finding active bookings for car: {}", car_id);

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE car_id = $1
                AND status = 'ongoing'
            ORDER BY window_start
            "#
        ))
        .bind(car_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding active bookings: {}", e);
            AppError::Database(format!("Failed to find active bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_for_car(&self, car_id: i32) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE car_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(car_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings for car {}: {}", car_id, e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_for_customer(&self, customer_id: i32) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE customer_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error listing bookings for customer {}: {}",
                customer_id, e
            );
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_by_state(
        &self,
        filter: BookingStateFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        debug!("Listing bookings with filter {:?}", filter);

        let where_clause = match filter {
            BookingStateFilter::Ongoing => "WHERE status = 'ongoing'",
            BookingStateFilter::Completed => "WHERE status = 'completed'",
            BookingStateFilter::Recent | BookingStateFilter::All => "",
        };

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            {where_clause}
            ORDER BY requested_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings: {}", e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    car_id: i32,
    customer_id: i32,
    requested_at: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    price_mode: String,
    duration_units: i32,
    total_price: Decimal,
    action: String,
    status: String,
    returned_at: Option<DateTime<Utc>>,
    overdue_units: Option<i32>,
    overdue_amount: Option<Decimal>,
    version: i32,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            car_id: row.car_id,
            customer_id: row.customer_id,
            requested_at: row.requested_at,
            window_start: row.window_start,
            window_end: row.window_end,
            price_mode: PgBookingRepository::parse_mode(&row.price_mode),
            duration_units: row.duration_units,
            total_price: row.total_price,
            action: PgBookingRepository::parse_action(&row.action),
            status: PgBookingRepository::parse_status(&row.status),
            returned_at: row.returned_at,
            overdue_units: row.overdue_units,
            overdue_amount: row.overdue_amount,
            version: row.version,
            updated_at: row.updated_at,
        }
    }
}
