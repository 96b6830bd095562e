//! Common traits for repositories and external collaborators
//!
//! Defines abstractions for database access, the clock, and outbound
//! notifications. Services are generic over these so the booking engine
//! can be exercised against in-memory implementations.

use crate::error::AppError;
use crate::models::{Booking, BookingStateFilter, Car, CarAvailability, Customer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Booking repository
///
/// Bookings are append-and-update only; there is no delete. Terminal
/// states stay queryable for audit and revenue history.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;

    /// Find booking by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Version-checked update
    ///
    /// The entity carries the version it was loaded at; the stored row is
    /// updated and its version bumped only when they still match. A stale
    /// version fails with `ConcurrencyConflict` and changes nothing.
    async fn update(&self, booking: &Booking) -> Result<Booking, AppError>;

    /// Bookings currently holding the given car
    async fn list_active_for_car(&self, car_id: i32) -> Result<Vec<Booking>, AppError>;

    /// Every booking ever made for the given car
    async fn list_for_car(&self, car_id: i32) -> Result<Vec<Booking>, AppError>;

    /// Every booking ever made by the given customer
    async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<Booking>, AppError>;

    /// Read-only projection by state class, newest first
    async fn list_by_state(
        &self,
        filter: BookingStateFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, AppError>;
}

/// Car aggregate repository
///
/// Revenue mutations are additive single-row updates so concurrent
/// transitions on different bookings of one car cannot lose counts.
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Find car by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Car>, AppError>;

    /// List cars, newest first
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Car>, AppError>;

    /// `ongoing_revenue += delta` (delta may be negative for reversals)
    async fn add_ongoing_revenue(&self, id: i32, delta: Decimal) -> Result<(), AppError>;

    /// Move revenue from ongoing to total: `ongoing -= accrued; total += settled`
    ///
    /// `settled` exceeds `accrued` by the overdue amount, which is realized
    /// directly without ever passing through the ongoing bucket.
    async fn settle_revenue(&self, id: i32, accrued: Decimal, settled: Decimal)
        -> Result<(), AppError>;

    /// Overwrite both revenue fields (repair path)
    async fn reset_revenue(&self, id: i32, ongoing: Decimal, total: Decimal)
        -> Result<(), AppError>;

    /// Update the derived availability flag in place
    async fn set_availability(&self, id: i32, availability: CarAvailability)
        -> Result<(), AppError>;
}

/// Customer aggregate repository
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find customer by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Customer>, AppError>;

    /// `ongoing_revenue += delta` (delta may be negative for reversals)
    async fn add_ongoing_revenue(&self, id: i32, delta: Decimal) -> Result<(), AppError>;

    /// Move revenue from ongoing to total: `ongoing -= accrued; total += settled`
    async fn settle_revenue(&self, id: i32, accrued: Decimal, settled: Decimal)
        -> Result<(), AppError>;

    /// Overwrite both revenue fields (repair path)
    async fn reset_revenue(&self, id: i32, ongoing: Decimal, total: Decimal)
        -> Result<(), AppError>;
}

/// Outbound notification boundary
///
/// Invoked after approve/reject decisions. Fire-and-forget from the
/// engine's perspective: a failure here is logged by the caller and never
/// rolls back the transition that triggered it.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Tell the customer their booking was decided
    async fn booking_decided(&self, booking: &Booking) -> Result<(), AppError>;
}

/// Time source
///
/// Supplies "now" for window validation and default request timestamps so
/// tests can pin the clock.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
