//! Booking lifecycle manager
//!
//! Owns the action/status state machine for bookings:
//! - request: validate window, price, conflict-check, persist Pending
//! - approve/reject: operator decision, revenue accrual, notification
//! - return/complete/cancel: drive the rental to settlement
//!
//! Creation and approval on one car are check-then-act sections and run
//! under a per-car async lock; operations on different cars never block
//! each other. Booking rows use optimistic versioning, and transitions
//! retry a bounded number of times on version conflicts.

use crate::availability::AvailabilityChecker;
use crate::revenue::RevenueAggregator;
use carflow_core::{
    config::RentalConfig,
    models::{Booking, Car, CarAvailability, PriceMode},
    pricing,
    traits::{BookingRepository, CarRepository, Clock, CustomerRepository, NotificationSender},
    AppError, AppResult,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Keyed lock registry: one async mutex per car
#[derive(Default)]
struct CarLocks {
    locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl CarLocks {
    fn lock_for(&self, car_id: i32) -> Arc<Mutex<()>> {
        self.locks.entry(car_id).or_default().clone()
    }
}

/// Inbound booking request
#[derive(Debug, Clone, Copy)]
pub struct BookingRequest {
    pub car_id: i32,
    pub customer_id: i32,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub price_mode: PriceMode,
}

/// Booking lifecycle manager
///
/// Generic over the repositories and the notification sender so the whole
/// engine can run against in-memory implementations in tests.
pub struct BookingManager<B, C, U, N> {
    bookings: Arc<B>,
    cars: Arc<C>,
    customers: Arc<U>,
    availability: AvailabilityChecker<B>,
    revenue: RevenueAggregator<B, C, U>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    locks: CarLocks,
    policy: RentalConfig,
}

impl<B, C, U, N> BookingManager<B, C, U, N>
where
    B: BookingRepository,
    C: CarRepository,
    U: CustomerRepository,
    N: NotificationSender,
{
    /// Create a new booking manager
    pub fn new(
        bookings: Arc<B>,
        cars: Arc<C>,
        customers: Arc<U>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        policy: RentalConfig,
    ) -> Self {
        Self {
            availability: AvailabilityChecker::new(Arc::clone(&bookings)),
            revenue: RevenueAggregator::new(
                Arc::clone(&bookings),
                Arc::clone(&cars),
                Arc::clone(&customers),
            ),
            bookings,
            cars,
            customers,
            notifier,
            clock,
            locks: CarLocks::default(),
            policy,
        }
    }

    /// The aggregator this manager drives, for the repair endpoint
    pub fn revenue(&self) -> RevenueAggregator<B, C, U> {
        self.revenue.clone()
    }

    /// Create a new booking
    ///
    /// Pricing and the overlap check both complete before anything is
    /// persisted: either the booking exists with its correct price, or
    /// nothing was created.
    #[instrument(skip(self))]
    pub async fn request_booking(&self, request: BookingRequest) -> AppResult<Booking> {
        let now = self.clock.now();

        if request.window_end <= request.window_start {
            return Err(AppError::InvalidWindow(format!(
                "window end {} is not after start {}",
                request.window_end, request.window_start
            )));
        }
        if request.window_start < now {
            return Err(AppError::InvalidWindow(format!(
                "window starts in the past ({} < {})",
                request.window_start, now
            )));
        }

        self.customers
            .find_by_id(request.customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound(request.customer_id))?;
        let car = self.car(request.car_id).await?;

        // Check-then-act section: overlap check and insert must not
        // interleave with another create or approve on this car.
        let lock = self.locks.lock_for(request.car_id);
        let _guard = lock.lock().await;

        let quote = pricing::compute_price(
            request.window_start,
            request.window_end,
            request.price_mode,
            &car.rates(),
        )?;

        if let Some(conflicting) = self
            .availability
            .find_conflict(request.car_id, request.window_start, request.window_end, None)
            .await?
        {
            return Err(AppError::ResourceUnavailable { conflicting });
        }

        let booking = Booking::new(
            request.car_id,
            request.customer_id,
            now,
            request.window_start,
            request.window_end,
            request.price_mode,
            quote.duration_units,
            quote.total_price,
        );
        let created = self.bookings.create(&booking).await?;

        info!(
            "Created booking {} on car {}: {} {} units, price {}",
            created.id,
            created.car_id,
            created.duration_units,
            created.price_mode,
            created.total_price
        );

        Ok(created)
    }

    /// Approve a pending booking
    #[instrument(skip(self))]
    pub async fn approve(&self, id: Uuid) -> AppResult<Booking> {
        self.retrying("approve", id, || self.try_approve(id)).await
    }

    /// Reject a pending booking
    #[instrument(skip(self))]
    pub async fn reject(&self, id: Uuid) -> AppResult<Booking> {
        self.retrying("reject", id, || self.try_reject(id)).await
    }

    /// Record the car coming back, late or not
    #[instrument(skip(self))]
    pub async fn return_car(&self, id: Uuid, returned_at: DateTime<Utc>) -> AppResult<Booking> {
        self.retrying("return", id, || self.try_return(id, returned_at))
            .await
    }

    /// Settle a returned booking
    #[instrument(skip(self))]
    pub async fn complete(&self, id: Uuid) -> AppResult<Booking> {
        self.retrying("complete", id, || self.try_complete(id)).await
    }

    /// Operator override: cancel an active booking
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid) -> AppResult<Booking> {
        self.retrying("cancel", id, || self.try_cancel(id)).await
    }

    async fn try_approve(&self, id: Uuid) -> AppResult<Booking> {
        let current = self.load(id).await?;

        let lock = self.locks.lock_for(current.car_id);
        let _guard = lock.lock().await;

        // Reload under the lock; the decision must not act on a stale view.
        let current = self.load(id).await?;
        let mut next = current.clone();
        next.approve()?;

        // First-approved-wins: a concurrent approval may already hold the slot.
        if let Some(conflicting) = self
            .availability
            .find_conflict(next.car_id, next.window_start, next.window_end, Some(next.id))
            .await?
        {
            return Err(AppError::ResourceUnavailable { conflicting });
        }

        let updated = self.bookings.update(&next).await?;

        if let Err(e) = self
            .revenue
            .accrue_ongoing(updated.car_id, updated.customer_id, updated.total_price)
            .await
        {
            self.restore(&updated, &current).await;
            return Err(e);
        }

        if let Err(e) = self
            .cars
            .set_availability(updated.car_id, CarAvailability::Reserved)
            .await
        {
            // The flag is a derived cache; the repair path rebuilds it.
            warn!("Failed to mark car {} reserved: {}", updated.car_id, e);
        }

        self.notify(&updated).await;

        info!("Approved booking {} on car {}", updated.id, updated.car_id);
        Ok(updated)
    }

    async fn try_reject(&self, id: Uuid) -> AppResult<Booking> {
        let current = self.load(id).await?;
        let mut next = current.clone();
        next.reject()?;

        let updated = self.bookings.update(&next).await?;

        self.notify(&updated).await;

        info!("Rejected booking {}", updated.id);
        Ok(updated)
    }

    async fn try_return(&self, id: Uuid, returned_at: DateTime<Utc>) -> AppResult<Booking> {
        let current = self.load(id).await?;
        let mut next = current.clone();

        let overdue = if returned_at > current.window_end {
            let car = self.car(current.car_id).await?;
            let quote = pricing::compute_overdue(
                current.window_end,
                returned_at,
                current.price_mode,
                &car.rates(),
            )?;
            Some((quote.duration_units, quote.total_price))
        } else {
            None
        };

        next.record_return(returned_at, overdue)?;
        let updated = self.bookings.update(&next).await?;

        info!(
            "Booking {} returned at {} ({})",
            updated.id, returned_at, updated.status
        );
        Ok(updated)
    }

    async fn try_complete(&self, id: Uuid) -> AppResult<Booking> {
        let current = self.load(id).await?;
        let mut next = current.clone();
        next.complete()?;

        let updated = self.bookings.update(&next).await?;

        if let Err(e) = self
            .revenue
            .settle_to_total(
                updated.car_id,
                updated.customer_id,
                updated.total_price,
                updated.settled_amount(),
            )
            .await
        {
            self.restore(&updated, &current).await;
            return Err(e);
        }

        if let Err(e) = self.refresh_availability(updated.car_id).await {
            warn!(
                "Failed to refresh availability of car {}: {}",
                updated.car_id, e
            );
        }

        info!(
            "Completed booking {}: settled {}",
            updated.id,
            updated.settled_amount()
        );
        Ok(updated)
    }

    async fn try_cancel(&self, id: Uuid) -> AppResult<Booking> {
        let current = self.load(id).await?;
        let mut next = current.clone();
        next.cancel()?;

        let updated = self.bookings.update(&next).await?;

        if let Err(e) = self
            .revenue
            .reverse_ongoing(updated.car_id, updated.customer_id, updated.total_price)
            .await
        {
            self.restore(&updated, &current).await;
            return Err(e);
        }

        if let Err(e) = self.refresh_availability(updated.car_id).await {
            warn!(
                "Failed to refresh availability of car {}: {}",
                updated.car_id, e
            );
        }

        info!("Cancelled booking {}", updated.id);
        Ok(updated)
    }

    /// Retry an operation on optimistic-lock conflicts, up to the policy bound
    async fn retrying<F, Fut>(&self, event: &str, id: Uuid, op: F) -> AppResult<Booking>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<Booking>>,
    {
        let retries = self.policy.max_transition_retries.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Err(AppError::ConcurrencyConflict(msg)) if attempt + 1 < retries => {
                    attempt += 1;
                    warn!(
                        "Retrying {} on booking {} after conflict (attempt {}): {}",
                        event, id, attempt, msg
                    );
                }
                other => return other,
            }
        }
    }

    /// Undo a booking update whose side effects could not be applied
    ///
    /// Transition application is all-or-nothing: a booking must not sit in
    /// its "to" state with the revenue move missing, or vice versa.
    async fn restore(&self, updated: &Booking, prior: &Booking) {
        let mut rollback = updated.clone();
        rollback.action = prior.action;
        rollback.status = prior.status;
        rollback.returned_at = prior.returned_at;
        rollback.overdue_units = prior.overdue_units;
        rollback.overdue_amount = prior.overdue_amount;

        if let Err(e) = self.bookings.update(&rollback).await {
            error!(
                "Failed to roll back booking {} after side-effect error: {}",
                updated.id, e
            );
        }
    }

    async fn refresh_availability(&self, car_id: i32) -> AppResult<()> {
        let state = self
            .availability
            .availability_state(
                car_id,
                self.clock.now(),
                Duration::hours(self.policy.availability_lookahead_hours),
            )
            .await?;
        self.cars.set_availability(car_id, state).await
    }

    /// Fire-and-forget: sender failures never fail the transition
    async fn notify(&self, booking: &Booking) {
        if let Err(e) = self.notifier.booking_decided(booking).await {
            warn!("Notification for booking {} failed: {}", booking.id, e);
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<Booking> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or(AppError::BookingNotFound(id))
    }

    async fn car(&self, id: i32) -> AppResult<Car> {
        self.cars
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound(id))
    }
}
