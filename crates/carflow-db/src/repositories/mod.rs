//! Repository implementations

pub mod booking_repo;
pub mod car_repo;
pub mod customer_repo;

pub use booking_repo::PgBookingRepository;
pub use car_repo::PgCarRepository;
pub use customer_repo::PgCustomerRepository;
