//! Availability checker
//!
//! Decides whether a candidate rental window collides with the bookings
//! currently holding a car, and derives the car's availability flag from
//! the same active set.
//!
//! Only Approved/Ongoing bookings block: Pending requests do not hold the
//! slot yet (first-approved-wins, not first-requested-wins), and every
//! state after return releases it permanently.

use carflow_core::{
    models::{Booking, CarAvailability},
    traits::BookingRepository,
    AppResult,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Half-open interval overlap: `[s1, e1)` meets `[s2, e2)`
#[inline]
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Availability checker over a booking repository
pub struct AvailabilityChecker<B> {
    bookings: Arc<B>,
}

impl<B> Clone for AvailabilityChecker<B> {
    fn clone(&self) -> Self {
        Self {
            bookings: Arc::clone(&self.bookings),
        }
    }
}

impl<B: BookingRepository> AvailabilityChecker<B> {
    /// Create a new availability checker
    pub fn new(bookings: Arc<B>) -> Self {
        Self { bookings }
    }

    /// Find an active booking colliding with the candidate window
    ///
    /// Returns the conflicting booking id so callers can name it in the
    /// rejection. `exclude` skips the booking being re-checked during its
    /// own approval.
    #[instrument(skip(self))]
    pub async fn find_conflict(
        &self,
        car_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<Option<Uuid>> {
        let active = self.bookings.list_active_for_car(car_id).await?;

        let conflict = active
            .iter()
            .filter(|b| Some(b.id) != exclude)
            .find(|b| overlaps(start, end, b.window_start, b.window_end))
            .map(|b| b.id);

        if let Some(id) = conflict {
            debug!(
                "Window [{}, {}) on car {} conflicts with booking {}",
                start, end, car_id, id
            );
        }

        Ok(conflict)
    }

    /// Check whether any active booking collides with the candidate window
    pub async fn has_overlap(
        &self,
        car_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        Ok(self.find_conflict(car_id, start, end, exclude).await?.is_some())
    }

    /// Derive the car's availability flag from its active bookings
    ///
    /// Reserved iff an active booking covers `now` or starts within the
    /// lookahead horizon.
    #[instrument(skip(self))]
    pub async fn availability_state(
        &self,
        car_id: i32,
        now: DateTime<Utc>,
        lookahead: Duration,
    ) -> AppResult<CarAvailability> {
        let active = self.bookings.list_active_for_car(car_id).await?;

        let reserved = active
            .iter()
            .any(|b| reserves_car(b, now, lookahead));

        Ok(if reserved {
            CarAvailability::Reserved
        } else {
            CarAvailability::Available
        })
    }
}

fn reserves_car(booking: &Booking, now: DateTime<Utc>, lookahead: Duration) -> bool {
    booking.window_end > now && booking.window_start <= now + lookahead
}
