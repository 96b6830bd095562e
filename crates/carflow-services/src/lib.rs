//! Business logic services for CarFlow
//!
//! This crate contains the booking engine that sits between the HTTP
//! layer and the repositories:
//!
//! - `BookingManager` - lifecycle state machine with per-car serialization
//! - `AvailabilityChecker` - overlap detection and the derived availability flag
//! - `RevenueAggregator` - incremental revenue bookkeeping plus the repair path
//! - `LogNotifier` - default notification boundary
//!
//! # Architecture
//!
//! Services are generic over the repository traits in `carflow-core` and
//! are wrapped in Arc for safe sharing across async tasks. All operations
//! are instrumented with tracing, and every failure path maps to AppError.

pub mod availability;
pub mod booking_manager;
pub mod notify;
pub mod revenue;

#[cfg(test)]
pub(crate) mod testing;

pub use availability::AvailabilityChecker;
pub use booking_manager::{BookingManager, BookingRequest};
pub use notify::LogNotifier;
pub use revenue::{RevenueAggregator, RevenueTotals};

use carflow_db::{PgBookingRepository, PgCarRepository, PgCustomerRepository};

/// The manager as wired in production
pub type PgBookingManager =
    BookingManager<PgBookingRepository, PgCarRepository, PgCustomerRepository, LogNotifier>;

/// The aggregator as wired in production
pub type PgRevenueAggregator =
    RevenueAggregator<PgBookingRepository, PgCarRepository, PgCustomerRepository>;
