//! CarFlow Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the CarFlow system. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for bookings, cars, and customers
//! - Version-checked booking updates for optimistic concurrency
//! - Atomic additive revenue updates on the aggregate rows

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use carflow_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
