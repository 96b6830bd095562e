//! Customer DTOs

use carflow_core::models::Customer;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Customer aggregate representation returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct CustomerResponse {
    /// Customer id
    pub id: i32,
    /// Price attributed to this customer's active-but-unsettled bookings
    pub ongoing_revenue: Decimal,
    /// Realized revenue
    pub total_revenue: Decimal,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            ongoing_revenue: c.ongoing_revenue,
            total_revenue: c.total_revenue,
            updated_at: c.updated_at,
        }
    }
}
