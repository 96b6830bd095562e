//! Data transfer objects

pub mod booking;
pub mod car;
pub mod common;
pub mod customer;

pub use booking::{
    ActionRequest, BookingDecision, BookingQueryParams, BookingResponse, CreateBookingRequest,
    StatusEvent, StatusEventRequest,
};
pub use car::CarResponse;
pub use common::{ApiResponse, PaginationParams};
pub use customer::CustomerResponse;
