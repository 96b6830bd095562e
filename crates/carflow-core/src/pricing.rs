//! Pricing calculator
//!
//! Pure, deterministic duration/price computation for a rental window.
//! No I/O; the caller supplies the car's rate card.

use crate::error::AppError;
use crate::models::{PriceMode, RateSchedule};
use crate::AppResult;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Result of pricing a rental window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Billed units: days or hours depending on the mode
    pub duration_units: i32,
    /// `duration_units` times the matching rate
    pub total_price: Decimal,
}

/// Price a rental window
///
/// Per-hour mode bills full elapsed hours and refuses windows under one
/// hour. Per-day mode bills full elapsed days with a minimum of one: any
/// booking under 24h in day mode still bills one full day.
pub fn compute_price(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    mode: PriceMode,
    rates: &RateSchedule,
) -> AppResult<Quote> {
    if window_end <= window_start {
        return Err(AppError::InvalidWindow(format!(
            "window end {} is not after start {}",
            window_end, window_start
        )));
    }

    let elapsed = window_end - window_start;

    let (duration_units, rate) = match mode {
        PriceMode::PerHour => {
            let hours = elapsed.num_hours();
            if hours < 1 {
                return Err(AppError::WindowTooShort(format!(
                    "{} minutes is under one billable hour",
                    elapsed.num_minutes()
                )));
            }
            (hours as i32, rates.per_hour)
        }
        PriceMode::PerDay => {
            // Floor, clamped to a one-day minimum.
            let days = elapsed.num_days().max(1);
            (days as i32, rates.per_day)
        }
    };

    Ok(Quote {
        duration_units,
        total_price: Decimal::from(duration_units) * rate,
    })
}

/// Price the overdue interval `(window_end, returned_at]` of a late return
///
/// Uses the booking's own mode and rate card. Unlike `compute_price`, both
/// modes clamp to a one-unit minimum: a late return always bills at least
/// one unit, however small the overshoot.
pub fn compute_overdue(
    window_end: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    mode: PriceMode,
    rates: &RateSchedule,
) -> AppResult<Quote> {
    if returned_at <= window_end {
        return Err(AppError::InvalidWindow(format!(
            "return time {} is not after window end {}",
            returned_at, window_end
        )));
    }

    let late = returned_at - window_end;

    let (duration_units, rate) = match mode {
        PriceMode::PerHour => (late.num_hours().max(1) as i32, rates.per_hour),
        PriceMode::PerDay => (late.num_days().max(1) as i32, rates.per_day),
    };

    Ok(Quote {
        duration_units,
        total_price: Decimal::from(duration_units) * rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn rates() -> RateSchedule {
        RateSchedule {
            per_day: dec!(1000),
            per_hour: dec!(80),
        }
    }

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_two_day_window_per_day() {
        // [Day0 09:00, Day2 09:00) at 1000/day
        let quote =
            compute_price(day0(), day0() + Duration::days(2), PriceMode::PerDay, &rates()).unwrap();
        assert_eq!(quote.duration_units, 2);
        assert_eq!(quote.total_price, dec!(2000));
    }

    #[test]
    fn test_per_day_floors_with_minimum_one() {
        // 10 hours bills one day
        let quote =
            compute_price(day0(), day0() + Duration::hours(10), PriceMode::PerDay, &rates())
                .unwrap();
        assert_eq!(quote.duration_units, 1);
        assert_eq!(quote.total_price, dec!(1000));

        // 25 hours floors to one day, not two
        let quote =
            compute_price(day0(), day0() + Duration::hours(25), PriceMode::PerDay, &rates())
                .unwrap();
        assert_eq!(quote.duration_units, 1);
        assert_eq!(quote.total_price, dec!(1000));

        // 48 hours is exactly two days
        let quote =
            compute_price(day0(), day0() + Duration::hours(48), PriceMode::PerDay, &rates())
                .unwrap();
        assert_eq!(quote.duration_units, 2);
    }

    #[test]
    fn test_per_hour_floors() {
        let quote =
            compute_price(day0(), day0() + Duration::minutes(150), PriceMode::PerHour, &rates())
                .unwrap();
        assert_eq!(quote.duration_units, 2);
        assert_eq!(quote.total_price, dec!(160));
    }

    #[test]
    fn test_per_hour_under_one_hour_fails() {
        let err = compute_price(day0(), day0() + Duration::minutes(45), PriceMode::PerHour, &rates())
            .unwrap_err();
        assert!(matches!(err, AppError::WindowTooShort(_)));
    }

    #[test]
    fn test_inverted_window_fails() {
        let err =
            compute_price(day0(), day0() - Duration::hours(1), PriceMode::PerDay, &rates())
                .unwrap_err();
        assert!(matches!(err, AppError::InvalidWindow(_)));

        let err = compute_price(day0(), day0(), PriceMode::PerDay, &rates()).unwrap_err();
        assert!(matches!(err, AppError::InvalidWindow(_)));
    }

    #[test]
    fn test_deterministic() {
        let end = day0() + Duration::hours(30);
        let a = compute_price(day0(), end, PriceMode::PerHour, &rates()).unwrap();
        let b = compute_price(day0(), end, PriceMode::PerHour, &rates()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_overdue_six_hours_per_day_bills_one_day() {
        let window_end = day0() + Duration::days(2);
        let quote = compute_overdue(
            window_end,
            window_end + Duration::hours(6),
            PriceMode::PerDay,
            &rates(),
        )
        .unwrap();
        assert_eq!(quote.duration_units, 1);
        assert_eq!(quote.total_price, dec!(1000));
    }

    #[test]
    fn test_overdue_clamps_to_one_unit_per_hour() {
        let window_end = day0();
        let quote = compute_overdue(
            window_end,
            window_end + Duration::minutes(20),
            PriceMode::PerHour,
            &rates(),
        )
        .unwrap();
        assert_eq!(quote.duration_units, 1);
        assert_eq!(quote.total_price, dec!(80));
    }

    #[test]
    fn test_overdue_requires_late_return() {
        let window_end = day0();
        let err = compute_overdue(window_end, window_end, PriceMode::PerDay, &rates()).unwrap_err();
        assert!(matches!(err, AppError::InvalidWindow(_)));
    }
}
