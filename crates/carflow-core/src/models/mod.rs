//! Domain models for CarFlow
//!
//! This module contains all the core domain models used throughout the application.

pub mod booking;
pub mod car;
pub mod customer;

pub use booking::{Booking, BookingAction, BookingStateFilter, BookingStatus, PriceMode};
pub use car::{Car, CarAvailability, RateSchedule};
pub use customer::Customer;
