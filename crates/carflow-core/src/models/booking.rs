//! Booking model
//!
//! A booking is a single rental request: one car, one customer, one time
//! window. It carries the approval decision (action) and the operational
//! lifecycle state (status), and is never physically deleted — terminal
//! states are retained for audit and revenue history.

use crate::error::AppError;
use crate::AppResult;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Pricing mode for a rental window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Billed per started day, minimum one day
    PerDay,
    /// Billed per full hour
    PerHour,
}

impl fmt::Display for PriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceMode::PerDay => write!(f, "per_day"),
            PriceMode::PerHour => write!(f, "per_hour"),
        }
    }
}

impl PriceMode {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "per_day" => Some(PriceMode::PerDay),
            "per_hour" => Some(PriceMode::PerHour),
            _ => None,
        }
    }
}

/// Approval decision on a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    /// Awaiting an operator decision
    #[default]
    Pending,
    /// Approved by an operator
    Approved,
    /// Rejected by an operator
    Rejected,
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingAction::Pending => write!(f, "pending"),
            BookingAction::Approved => write!(f, "approved"),
            BookingAction::Rejected => write!(f, "rejected"),
        }
    }
}

impl BookingAction {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BookingAction::Pending),
            "approved" => Some(BookingAction::Approved),
            "rejected" => Some(BookingAction::Rejected),
            _ => None,
        }
    }
}

/// Operational lifecycle state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, not yet decided
    #[default]
    Pending,
    /// Approved and holding the car for its window
    Ongoing,
    /// Car returned within the window
    Returned,
    /// Car returned after the window lapsed
    Overdue,
    /// Settled; revenue realized
    Completed,
    /// Rejected or cancelled; terminal
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Ongoing => write!(f, "ongoing"),
            BookingStatus::Returned => write!(f, "returned"),
            BookingStatus::Overdue => write!(f, "overdue"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "ongoing" => Some(BookingStatus::Ongoing),
            "returned" => Some(BookingStatus::Returned),
            "overdue" => Some(BookingStatus::Overdue),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the status is terminal
    pub fn is_final(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Read-projection filter over the booking set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingStateFilter {
    /// Bookings currently holding a car
    Ongoing,
    /// Settled bookings
    Completed,
    /// Most recently requested bookings
    Recent,
    /// Everything
    #[default]
    All,
}

impl BookingStateFilter {
    /// Parse from query-string value
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ongoing" => Some(BookingStateFilter::Ongoing),
            "completed" => Some(BookingStateFilter::Completed),
            "recent" => Some(BookingStateFilter::Recent),
            "all" => Some(BookingStateFilter::All),
            _ => None,
        }
    }
}

/// Booking entity
///
/// Lifecycle: created Pending/Pending, decided by approve/reject, then
/// driven through return and completion. `total_price` is computed once at
/// creation; the only later financial change is the additive
/// `overdue_amount` recorded at a late return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Rented car
    pub car_id: i32,

    /// Requesting customer
    pub customer_id: i32,

    /// Creation timestamp
    pub requested_at: DateTime<Utc>,

    /// Rental window start (inclusive)
    pub window_start: DateTime<Utc>,

    /// Rental window end (exclusive)
    pub window_end: DateTime<Utc>,

    /// Pricing mode chosen at creation
    pub price_mode: PriceMode,

    /// Billed units (days or hours), derived at creation
    pub duration_units: i32,

    /// Total price, derived at creation and immutable thereafter
    pub total_price: Decimal,

    /// Approval decision
    pub action: BookingAction,

    /// Lifecycle status
    pub status: BookingStatus,

    /// When the car came back, if it has
    pub returned_at: Option<DateTime<Utc>>,

    /// Late units billed at return, if overdue
    pub overdue_units: Option<i32>,

    /// Late amount billed at return, if overdue
    pub overdue_amount: Option<Decimal>,

    /// Optimistic concurrency token
    pub version: i32,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new pending booking with a computed price
    pub fn new(
        car_id: i32,
        customer_id: i32,
        requested_at: DateTime<Utc>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        price_mode: PriceMode,
        duration_units: i32,
        total_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            car_id,
            customer_id,
            requested_at,
            window_start,
            window_end,
            price_mode,
            duration_units,
            total_price,
            action: BookingAction::Pending,
            status: BookingStatus::Pending,
            returned_at: None,
            overdue_units: None,
            overdue_amount: None,
            version: 1,
            updated_at: requested_at,
        }
    }

    /// Check if this booking currently holds its car
    ///
    /// Only active bookings block new requests on the same car. Pending
    /// requests do not hold the slot yet (first-approved-wins), and every
    /// state after return releases it.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Ongoing
    }

    /// Check if this booking contributes to ongoing revenue
    ///
    /// Revenue stays in the ongoing bucket from approval until settlement,
    /// including the returned-but-not-completed span.
    pub fn accrues_ongoing(&self) -> bool {
        self.action == BookingAction::Approved
            && matches!(
                self.status,
                BookingStatus::Ongoing | BookingStatus::Returned | BookingStatus::Overdue
            )
    }

    /// Check if this booking's revenue has been realized
    pub fn is_settled(&self) -> bool {
        self.action == BookingAction::Approved && self.status == BookingStatus::Completed
    }

    /// Amount realized at completion: base price plus any overdue amount
    pub fn settled_amount(&self) -> Decimal {
        self.total_price + self.overdue_amount.unwrap_or(Decimal::ZERO)
    }

    fn illegal(&self, event: &str) -> AppError {
        AppError::IllegalTransition(format!(
            "cannot {} booking {} in state {}/{}",
            event, self.id, self.action, self.status
        ))
    }

    /// Pending/Pending -> Approved/Ongoing
    pub fn approve(&mut self) -> AppResult<()> {
        if self.action != BookingAction::Pending || self.status != BookingStatus::Pending {
            return Err(self.illegal("approve"));
        }
        self.action = BookingAction::Approved;
        self.status = BookingStatus::Ongoing;
        Ok(())
    }

    /// Pending/Pending -> Rejected/Cancelled
    pub fn reject(&mut self) -> AppResult<()> {
        if self.action != BookingAction::Pending || self.status != BookingStatus::Pending {
            return Err(self.illegal("reject"));
        }
        self.action = BookingAction::Rejected;
        self.status = BookingStatus::Cancelled;
        Ok(())
    }

    /// Approved/Ongoing -> Approved/Returned or Approved/Overdue
    ///
    /// `overdue` carries the (units, amount) billed for a late return and
    /// must be present exactly when `returned_at > window_end`.
    pub fn record_return(
        &mut self,
        returned_at: DateTime<Utc>,
        overdue: Option<(i32, Decimal)>,
    ) -> AppResult<()> {
        if self.action != BookingAction::Approved || self.status != BookingStatus::Ongoing {
            return Err(self.illegal("return"));
        }
        self.returned_at = Some(returned_at);
        match overdue {
            Some((units, amount)) => {
                self.status = BookingStatus::Overdue;
                self.overdue_units = Some(units);
                self.overdue_amount = Some(amount);
            }
            None => {
                self.status = BookingStatus::Returned;
            }
        }
        Ok(())
    }

    /// Approved/Returned or Approved/Overdue -> Approved/Completed
    pub fn complete(&mut self) -> AppResult<()> {
        if self.action != BookingAction::Approved
            || !matches!(self.status, BookingStatus::Returned | BookingStatus::Overdue)
        {
            return Err(self.illegal("complete"));
        }
        self.status = BookingStatus::Completed;
        Ok(())
    }

    /// Approved/Ongoing or Approved/Overdue -> Approved/Cancelled (operator override)
    pub fn cancel(&mut self) -> AppResult<()> {
        if self.action != BookingAction::Approved
            || !matches!(self.status, BookingStatus::Ongoing | BookingStatus::Overdue)
        {
            return Err(self.illegal("cancel"));
        }
        self.status = BookingStatus::Cancelled;
        Ok(())
    }
}
