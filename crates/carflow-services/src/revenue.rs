//! Revenue aggregator
//!
//! Maintains the ongoing/total revenue fields on the car and customer
//! aggregate rows. Mutations are invoked only from lifecycle transitions,
//! never inlined ad hoc, so the bookkeeping stays auditable.
//!
//! Two paths must agree: the incremental updates applied at each
//! transition, and `recompute_*`, which rebuilds the fields from the
//! booking set. The recompute path is an idempotent repair operation.

use carflow_core::{
    models::Booking,
    traits::{BookingRepository, CarRepository, CustomerRepository},
    AppResult,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Rebuilt revenue pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevenueTotals {
    /// Price attributed to active-but-unsettled bookings
    pub ongoing: Decimal,
    /// Realized revenue, including overdue amounts
    pub total: Decimal,
}

/// Sum a booking set into revenue totals
///
/// Ongoing collects the base price of every booking between approval and
/// settlement; total collects base plus overdue for settled ones. This is
/// the reference the incremental path must match.
pub fn totals_of(bookings: &[Booking]) -> RevenueTotals {
    let mut totals = RevenueTotals {
        ongoing: Decimal::ZERO,
        total: Decimal::ZERO,
    };
    for b in bookings {
        if b.accrues_ongoing() {
            totals.ongoing += b.total_price;
        } else if b.is_settled() {
            totals.total += b.settled_amount();
        }
    }
    totals
}

/// Revenue aggregator over the three repositories
pub struct RevenueAggregator<B, C, U> {
    bookings: Arc<B>,
    cars: Arc<C>,
    customers: Arc<U>,
}

impl<B, C, U> Clone for RevenueAggregator<B, C, U> {
    fn clone(&self) -> Self {
        Self {
            bookings: Arc::clone(&self.bookings),
            cars: Arc::clone(&self.cars),
            customers: Arc::clone(&self.customers),
        }
    }
}

impl<B, C, U> RevenueAggregator<B, C, U>
where
    B: BookingRepository,
    C: CarRepository,
    U: CustomerRepository,
{
    /// Create a new revenue aggregator
    pub fn new(bookings: Arc<B>, cars: Arc<C>, customers: Arc<U>) -> Self {
        Self {
            bookings,
            cars,
            customers,
        }
    }

    /// Add newly approved revenue to both ongoing buckets
    ///
    /// Applied to the car first; if the customer side fails the car side
    /// is compensated so the two mirrors cannot drift apart.
    #[instrument(skip(self))]
    pub async fn accrue_ongoing(
        &self,
        car_id: i32,
        customer_id: i32,
        amount: Decimal,
    ) -> AppResult<()> {
        self.cars.add_ongoing_revenue(car_id, amount).await?;

        if let Err(e) = self.customers.add_ongoing_revenue(customer_id, amount).await {
            if let Err(undo) = self.cars.add_ongoing_revenue(car_id, -amount).await {
                error!(
                    "Failed to compensate car {} after customer accrual error: {}",
                    car_id, undo
                );
            }
            return Err(e);
        }

        Ok(())
    }

    /// Reverse a previously accrued amount (operator cancel)
    #[instrument(skip(self))]
    pub async fn reverse_ongoing(
        &self,
        car_id: i32,
        customer_id: i32,
        amount: Decimal,
    ) -> AppResult<()> {
        self.cars.add_ongoing_revenue(car_id, -amount).await?;

        if let Err(e) = self
            .customers
            .add_ongoing_revenue(customer_id, -amount)
            .await
        {
            if let Err(undo) = self.cars.add_ongoing_revenue(car_id, amount).await {
                error!(
                    "Failed to compensate car {} after customer reversal error: {}",
                    car_id, undo
                );
            }
            return Err(e);
        }

        Ok(())
    }

    /// Move revenue from ongoing to total on both aggregates
    ///
    /// `accrued` leaves the ongoing bucket; `settled` (base plus overdue)
    /// lands in total. Callers must not settle an amount that was never
    /// accrued.
    #[instrument(skip(self))]
    pub async fn settle_to_total(
        &self,
        car_id: i32,
        customer_id: i32,
        accrued: Decimal,
        settled: Decimal,
    ) -> AppResult<()> {
        self.cars.settle_revenue(car_id, accrued, settled).await?;

        if let Err(e) = self
            .customers
            .settle_revenue(customer_id, accrued, settled)
            .await
        {
            if let Err(undo) = self.cars.settle_revenue(car_id, -accrued, -settled).await {
                error!(
                    "Failed to compensate car {} after customer settle error: {}",
                    car_id, undo
                );
            }
            return Err(e);
        }

        Ok(())
    }

    /// Rebuild a car's revenue fields from its booking history
    #[instrument(skip(self))]
    pub async fn recompute_car(&self, car_id: i32) -> AppResult<RevenueTotals> {
        let bookings = self.bookings.list_for_car(car_id).await?;
        let totals = totals_of(&bookings);

        self.cars
            .reset_revenue(car_id, totals.ongoing, totals.total)
            .await?;

        info!(
            "Recomputed revenue for car {}: ongoing={}, total={}",
            car_id, totals.ongoing, totals.total
        );

        Ok(totals)
    }

    /// Rebuild a customer's revenue fields from their booking history
    #[instrument(skip(self))]
    pub async fn recompute_customer(&self, customer_id: i32) -> AppResult<RevenueTotals> {
        let bookings = self.bookings.list_for_customer(customer_id).await?;
        let totals = totals_of(&bookings);

        self.customers
            .reset_revenue(customer_id, totals.ongoing, totals.total)
            .await?;

        info!(
            "Recomputed revenue for customer {}: ongoing={}, total={}",
            customer_id, totals.ongoing, totals.total
        );

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carflow_core::models::{BookingStatus, PriceMode};
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn booking(status: BookingStatus, price: Decimal, overdue: Option<Decimal>) -> Booking {
        let now = Utc::now();
        let mut b = Booking::new(
            1,
            1,
            now,
            now,
            now + Duration::days(1),
            PriceMode::PerDay,
            1,
            price,
        );
        if status != BookingStatus::Pending {
            b.action = carflow_core::models::BookingAction::Approved;
        }
        b.status = status;
        b.overdue_amount = overdue;
        b
    }

    #[test]
    fn test_totals_of_buckets_by_lifecycle() {
        let set = vec![
            booking(BookingStatus::Pending, dec!(500), None),
            booking(BookingStatus::Ongoing, dec!(2000), None),
            booking(BookingStatus::Returned, dec!(800), None),
            booking(BookingStatus::Overdue, dec!(1200), Some(dec!(300))),
            booking(BookingStatus::Completed, dec!(1000), Some(dec!(250))),
            booking(BookingStatus::Cancelled, dec!(4000), None),
        ];

        let totals = totals_of(&set);
        // ongoing: 2000 + 800 + 1200 (overdue amounts settle straight to total)
        assert_eq!(totals.ongoing, dec!(4000));
        // total: 1000 + 250
        assert_eq!(totals.total, dec!(1250));
    }

    #[test]
    fn test_totals_of_empty_set() {
        let totals = totals_of(&[]);
        assert_eq!(totals.ongoing, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }
}
