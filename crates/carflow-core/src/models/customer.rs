//! Customer model
//!
//! Profile data (addresses, phone numbers, images) lives outside this
//! system; the aggregate here only tracks the customer's revenue mirror of
//! the car-side bookkeeping.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer aggregate row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: i32,

    /// Price attributed to this customer's active-but-unsettled bookings
    pub ongoing_revenue: Decimal,

    /// Realized revenue from this customer, including overdue amounts
    pub total_revenue: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
