//! Car model
//!
//! The rentable asset. Catalog management (brand, model, registration) is
//! an external concern; this aggregate carries only what the booking engine
//! needs: the rate card and the derived revenue/availability fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived availability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CarAvailability {
    /// No active booking holds the car
    #[default]
    Available,
    /// An active booking covers now or starts within the lookahead
    Reserved,
}

impl fmt::Display for CarAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarAvailability::Available => write!(f, "available"),
            CarAvailability::Reserved => write!(f, "reserved"),
        }
    }
}

impl CarAvailability {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(CarAvailability::Available),
            "reserved" => Some(CarAvailability::Reserved),
            _ => None,
        }
    }
}

/// Rate card for one car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// Price per billed day
    pub per_day: Decimal,
    /// Price per billed hour
    pub per_hour: Decimal,
}

/// Car aggregate row
///
/// `ongoing_revenue` and `total_revenue` are maintained incrementally by
/// lifecycle transitions and can be rebuilt from the booking set as an
/// idempotent repair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    /// Unique identifier
    pub id: i32,

    /// Rate per billed day
    pub rate_per_day: Decimal,

    /// Rate per billed hour
    pub rate_per_hour: Decimal,

    /// Price attributed to active-but-unsettled bookings
    pub ongoing_revenue: Decimal,

    /// Realized revenue, including overdue amounts
    pub total_revenue: Decimal,

    /// Derived availability flag, updated in place
    pub availability: CarAvailability,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// The car's rate card, as the pricing calculator consumes it
    #[inline]
    pub fn rates(&self) -> RateSchedule {
        RateSchedule {
            per_day: self.rate_per_day,
            per_hour: self.rate_per_hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rates() {
        let car = Car {
            id: 1,
            rate_per_day: dec!(1000),
            rate_per_hour: dec!(80),
            ongoing_revenue: Decimal::ZERO,
            total_revenue: Decimal::ZERO,
            availability: CarAvailability::Available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let rates = car.rates();
        assert_eq!(rates.per_day, dec!(1000));
        assert_eq!(rates.per_hour, dec!(80));
    }

    #[test]
    fn test_availability_parse() {
        assert_eq!(
            CarAvailability::from_str("reserved"),
            Some(CarAvailability::Reserved)
        );
        assert_eq!(CarAvailability::from_str("in_shop"), None);
        assert_eq!(CarAvailability::Reserved.to_string(), "reserved");
    }
}
