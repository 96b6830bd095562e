//! Car DTOs

use carflow_core::models::Car;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Car aggregate representation returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct CarResponse {
    /// Car id
    pub id: i32,
    /// Rate per billed day
    pub rate_per_day: Decimal,
    /// Rate per billed hour
    pub rate_per_hour: Decimal,
    /// Price attributed to active-but-unsettled bookings
    pub ongoing_revenue: Decimal,
    /// Realized revenue
    pub total_revenue: Decimal,
    /// Derived availability flag
    pub availability: String,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Car> for CarResponse {
    fn from(c: Car) -> Self {
        Self {
            id: c.id,
            rate_per_day: c.rate_per_day,
            rate_per_hour: c.rate_per_hour,
            ongoing_revenue: c.ongoing_revenue,
            total_revenue: c.total_revenue,
            availability: c.availability.to_string(),
            updated_at: c.updated_at,
        }
    }
}
