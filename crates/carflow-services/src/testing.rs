//! In-memory trait implementations for service tests
//!
//! Mirrors the Pg repositories closely enough to exercise the engine:
//! version-checked booking updates, additive revenue counters, and a
//! pinnable clock.

use carflow_core::{
    models::{
        Booking, BookingStateFilter, Car, CarAvailability, Customer, PriceMode,
    },
    traits::{
        BookingRepository, CarRepository, Clock, CustomerRepository, NotificationSender,
    },
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// A pending booking on the given car over the given window
pub fn booking_for(car_id: i32, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
    Booking::new(
        car_id,
        1,
        start - Duration::hours(1),
        start,
        end,
        PriceMode::PerDay,
        1,
        dec!(1000),
    )
}

/// A car with the given rate card and zeroed revenue
pub fn car(id: i32, per_day: Decimal, per_hour: Decimal) -> Car {
    let now = Utc::now();
    Car {
        id,
        rate_per_day: per_day,
        rate_per_hour: per_hour,
        ongoing_revenue: Decimal::ZERO,
        total_revenue: Decimal::ZERO,
        availability: CarAvailability::Available,
        created_at: now,
        updated_at: now,
    }
}

/// A customer with zeroed revenue
pub fn customer(id: i32) -> Customer {
    let now = Utc::now();
    Customer {
        id,
        ongoing_revenue: Decimal::ZERO,
        total_revenue: Decimal::ZERO,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory BookingRepository
#[derive(Default)]
pub struct MemBookingRepository {
    inner: Mutex<HashMap<Uuid, Booking>>,
}

#[async_trait]
impl BookingRepository for MemBookingRepository {
    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        let mut map = self.inner.lock();
        map.insert(booking.id, booking.clone());
        Ok(booking.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.inner.lock().get(&id).cloned())
    }

    async fn update(&self, booking: &Booking) -> AppResult<Booking> {
        let mut map = self.inner.lock();
        let stored = map
            .get_mut(&booking.id)
            .ok_or(AppError::BookingNotFound(booking.id))?;

        if stored.version != booking.version {
            return Err(AppError::ConcurrencyConflict(format!(
                "booking {} was modified concurrently (stale version {})",
                booking.id, booking.version
            )));
        }

        let mut next = booking.clone();
        next.version += 1;
        next.updated_at = Utc::now();
        *stored = next.clone();
        Ok(next)
    }

    async fn list_active_for_car(&self, car_id: i32) -> AppResult<Vec<Booking>> {
        Ok(self
            .inner
            .lock()
            .values()
            .filter(|b| b.car_id == car_id && b.is_active())
            .cloned()
            .collect())
    }

    async fn list_for_car(&self, car_id: i32) -> AppResult<Vec<Booking>> {
        Ok(self
            .inner
            .lock()
            .values()
            .filter(|b| b.car_id == car_id)
            .cloned()
            .collect())
    }

    async fn list_for_customer(&self, customer_id: i32) -> AppResult<Vec<Booking>> {
        Ok(self
            .inner
            .lock()
            .values()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_by_state(
        &self,
        filter: BookingStateFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let mut all: Vec<Booking> = self
            .inner
            .lock()
            .values()
            .filter(|b| match filter {
                BookingStateFilter::Ongoing => b.is_active(),
                BookingStateFilter::Completed => b.is_settled(),
                BookingStateFilter::Recent | BookingStateFilter::All => true,
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// In-memory CarRepository with fault injection on revenue updates
#[derive(Default)]
pub struct MemCarRepository {
    inner: Mutex<HashMap<i32, Car>>,
}

impl MemCarRepository {
    /// Seed a car
    pub fn put(&self, car: Car) {
        self.inner.lock().insert(car.id, car);
    }

    /// Read back a seeded car
    pub fn get(&self, id: i32) -> Option<Car> {
        self.inner.lock().get(&id).cloned()
    }
}

#[async_trait]
impl CarRepository for MemCarRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Car>> {
        Ok(self.inner.lock().get(&id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Car>> {
        let mut all: Vec<Car> = self.inner.lock().values().cloned().collect();
        all.sort_by_key(|c| c.id);
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn add_ongoing_revenue(&self, id: i32, delta: Decimal) -> AppResult<()> {
        let mut map = self.inner.lock();
        let car = map.get_mut(&id).ok_or(AppError::ResourceNotFound(id))?;
        car.ongoing_revenue += delta;
        Ok(())
    }

    async fn settle_revenue(&self, id: i32, accrued: Decimal, settled: Decimal) -> AppResult<()> {
        let mut map = self.inner.lock();
        let car = map.get_mut(&id).ok_or(AppError::ResourceNotFound(id))?;
        car.ongoing_revenue -= accrued;
        car.total_revenue += settled;
        Ok(())
    }

    async fn reset_revenue(&self, id: i32, ongoing: Decimal, total: Decimal) -> AppResult<()> {
        let mut map = self.inner.lock();
        let car = map.get_mut(&id).ok_or(AppError::ResourceNotFound(id))?;
        car.ongoing_revenue = ongoing;
        car.total_revenue = total;
        Ok(())
    }

    async fn set_availability(&self, id: i32, availability: CarAvailability) -> AppResult<()> {
        let mut map = self.inner.lock();
        let car = map.get_mut(&id).ok_or(AppError::ResourceNotFound(id))?;
        car.availability = availability;
        Ok(())
    }
}

/// In-memory CustomerRepository with fault injection on revenue updates
#[derive(Default)]
pub struct MemCustomerRepository {
    inner: Mutex<HashMap<i32, Customer>>,
    fail_revenue_updates: AtomicBool,
}

impl MemCustomerRepository {
    /// Seed a customer
    pub fn put(&self, customer: Customer) {
        self.inner.lock().insert(customer.id, customer);
    }

    /// Read back a seeded customer
    pub fn get(&self, id: i32) -> Option<Customer> {
        self.inner.lock().get(&id).cloned()
    }

    /// Make every subsequent revenue update fail
    pub fn fail_revenue_updates(&self, fail: bool) {
        self.fail_revenue_updates.store(fail, Ordering::SeqCst);
    }

    fn check_fault(&self) -> AppResult<()> {
        if self.fail_revenue_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database("injected customer fault".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for MemCustomerRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Customer>> {
        Ok(self.inner.lock().get(&id).cloned())
    }

    async fn add_ongoing_revenue(&self, id: i32, delta: Decimal) -> AppResult<()> {
        self.check_fault()?;
        let mut map = self.inner.lock();
        let customer = map.get_mut(&id).ok_or(AppError::CustomerNotFound(id))?;
        customer.ongoing_revenue += delta;
        Ok(())
    }

    async fn settle_revenue(&self, id: i32, accrued: Decimal, settled: Decimal) -> AppResult<()> {
        self.check_fault()?;
        let mut map = self.inner.lock();
        let customer = map.get_mut(&id).ok_or(AppError::CustomerNotFound(id))?;
        customer.ongoing_revenue -= accrued;
        customer.total_revenue += settled;
        Ok(())
    }

    async fn reset_revenue(&self, id: i32, ongoing: Decimal, total: Decimal) -> AppResult<()> {
        let mut map = self.inner.lock();
        let customer = map.get_mut(&id).ok_or(AppError::CustomerNotFound(id))?;
        customer.ongoing_revenue = ongoing;
        customer.total_revenue = total;
        Ok(())
    }
}

/// Notification sender that records calls and can be made to fail
#[derive(Default)]
pub struct RecordingNotifier {
    decided: Mutex<Vec<Uuid>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    /// Booking ids that were notified
    pub fn decided(&self) -> Vec<Uuid> {
        self.decided.lock().clone()
    }

    /// Make every subsequent send fail
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn booking_decided(&self, booking: &Booking) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Notification("injected sender fault".into()));
        }
        self.decided.lock().push(booking.id);
        Ok(())
    }
}

/// Pinnable clock
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Pin the clock at the given instant
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
