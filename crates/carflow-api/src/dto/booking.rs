//! Booking DTOs

use super::common::PaginationParams;
use carflow_core::{
    models::{Booking, BookingStateFilter, PriceMode},
    AppError, AppResult,
};
use carflow_services::BookingRequest;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /bookings`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// Car to rent
    #[validate(range(min = 1))]
    pub car_id: i32,

    /// Requesting customer
    #[validate(range(min = 1))]
    pub customer_id: i32,

    /// Rental window start (inclusive)
    pub window_start: DateTime<Utc>,

    /// Rental window end (exclusive)
    pub window_end: DateTime<Utc>,

    /// Pricing mode: `per_day` or `per_hour`
    pub price_mode: String,
}

impl CreateBookingRequest {
    /// Validate and convert into the service-level request
    pub fn to_request(&self) -> AppResult<BookingRequest> {
        self.validate()?;

        let price_mode = PriceMode::from_str(&self.price_mode)
            .ok_or_else(|| AppError::UnsupportedPriceMode(self.price_mode.clone()))?;

        Ok(BookingRequest {
            car_id: self.car_id,
            customer_id: self.customer_id,
            window_start: self.window_start,
            window_end: self.window_end,
            price_mode,
        })
    }
}

/// Operator decision on a pending booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDecision {
    /// Approve the request
    Approve,
    /// Reject the request
    Reject,
}

/// Body of `PUT /bookings/{id}/action`
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    /// `approve` or `reject`
    pub action: String,
}

impl ActionRequest {
    /// Parse the decision
    pub fn decision(&self) -> AppResult<BookingDecision> {
        match self.action.to_lowercase().as_str() {
            "approve" => Ok(BookingDecision::Approve),
            "reject" => Ok(BookingDecision::Reject),
            other => Err(AppError::Validation(format!(
                "unknown action '{}', expected approve or reject",
                other
            ))),
        }
    }
}

/// Lifecycle event on an approved booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// The car came back at the given instant
    Return(DateTime<Utc>),
    /// Settle a returned booking
    Complete,
    /// Operator override: cancel an active booking
    Cancel,
}

/// Body of `PUT /bookings/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEventRequest {
    /// `return`, `complete`, or `cancel`
    pub event: String,

    /// Required for `return`
    pub returned_at: Option<DateTime<Utc>>,
}

impl StatusEventRequest {
    /// Parse the event
    pub fn event(&self) -> AppResult<StatusEvent> {
        match self.event.to_lowercase().as_str() {
            "return" => {
                let returned_at = self
                    .returned_at
                    .ok_or_else(|| AppError::MissingField("returned_at".to_string()))?;
                Ok(StatusEvent::Return(returned_at))
            }
            "complete" => Ok(StatusEvent::Complete),
            "cancel" => Ok(StatusEvent::Cancel),
            other => Err(AppError::Validation(format!(
                "unknown status event '{}', expected return, complete or cancel",
                other
            ))),
        }
    }
}

/// Query parameters for `GET /bookings`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BookingQueryParams {
    /// `ongoing`, `completed`, `recent`, or `all` (default)
    pub state: Option<String>,

    /// Restrict to one customer's bookings
    pub customer_id: Option<i32>,

    /// Page number (1-indexed)
    pub page: Option<i64>,

    /// Items per page
    pub per_page: Option<i64>,
}

impl BookingQueryParams {
    /// Parse the state filter, defaulting to `all`
    pub fn state_filter(&self) -> AppResult<BookingStateFilter> {
        match &self.state {
            None => Ok(BookingStateFilter::All),
            Some(s) => BookingStateFilter::from_str(s).ok_or_else(|| {
                AppError::Validation(format!(
                    "unknown state '{}', expected ongoing, completed, recent or all",
                    s
                ))
            }),
        }
    }

    /// The pagination slice requested
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(50),
        }
        .clamped()
    }
}

/// Booking representation returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    /// Booking id
    pub id: Uuid,
    /// Rented car
    pub car_id: i32,
    /// Requesting customer
    pub customer_id: i32,
    /// Creation timestamp
    pub requested_at: DateTime<Utc>,
    /// Rental window start
    pub window_start: DateTime<Utc>,
    /// Rental window end
    pub window_end: DateTime<Utc>,
    /// Pricing mode
    pub price_mode: String,
    /// Billed units
    pub duration_units: i32,
    /// Total price at creation
    pub total_price: Decimal,
    /// Approval decision
    pub action: String,
    /// Lifecycle status
    pub status: String,
    /// Return timestamp, if returned
    pub returned_at: Option<DateTime<Utc>>,
    /// Late units billed, if overdue
    pub overdue_units: Option<i32>,
    /// Late amount billed, if overdue
    pub overdue_amount: Option<Decimal>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            car_id: b.car_id,
            customer_id: b.customer_id,
            requested_at: b.requested_at,
            window_start: b.window_start,
            window_end: b.window_end,
            price_mode: b.price_mode.to_string(),
            duration_units: b.duration_units,
            total_price: b.total_price,
            action: b.action.to_string(),
            status: b.status.to_string(),
            returned_at: b.returned_at,
            overdue_units: b.overdue_units,
            overdue_amount: b.overdue_amount,
        }
    }
}
