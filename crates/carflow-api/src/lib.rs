//! API layer for CarFlow
//!
//! HTTP DTOs and handlers for the booking lifecycle, car and customer
//! aggregates, and the revenue repair endpoint.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs
)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{configure_bookings, configure_cars, configure_customers};
