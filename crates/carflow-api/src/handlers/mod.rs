//! HTTP request handlers

pub mod booking;
pub mod car;
pub mod customer;

pub use booking::configure as configure_bookings;
pub use car::configure as configure_cars;
pub use customer::configure as configure_customers;
