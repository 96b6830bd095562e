//! Unified error handling for CarFlow
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Booking Errors ====================
    #[error("Invalid rental window: {0}")]
    InvalidWindow(String),

    #[error("Rental window too short for hourly billing: {0}")]
    WindowTooShort(String),

    #[error("Unsupported price mode: {0}")]
    UnsupportedPriceMode(String),

    #[error("Car unavailable: conflicts with booking {conflicting}")]
    ResourceUnavailable { conflicting: Uuid },

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Concurrent modification: {0}")]
    ConcurrencyConflict(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("Car not found: {0}")]
    ResourceNotFound(i32),

    #[error("Customer not found: {0}")]
    CustomerNotFound(i32),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ==================== External Service Errors ====================
    #[error("Notification error: {0}")]
    Notification(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::InvalidWindow(_)
            | AppError::WindowTooShort(_)
            | AppError::UnsupportedPriceMode(_)
            | AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::BookingNotFound(_)
            | AppError::ResourceNotFound(_)
            | AppError::CustomerNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::ResourceUnavailable { .. }
            | AppError::IllegalTransition(_)
            | AppError::ConcurrencyConflict(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::InvalidWindow(_) => "invalid_window",
            AppError::WindowTooShort(_) => "window_too_short",
            AppError::UnsupportedPriceMode(_) => "unsupported_price_mode",
            AppError::ResourceUnavailable { .. } => "resource_unavailable",
            AppError::IllegalTransition(_) => "illegal_transition",
            AppError::ConcurrencyConflict(_) => "concurrency_conflict",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::ResourceNotFound(_) => "resource_not_found",
            AppError::CustomerNotFound(_) => "customer_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::Notification(_) => "notification_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::InvalidWindow("end before start".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BookingNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ResourceUnavailable {
                conflicting: Uuid::nil()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::IllegalTransition("approve on completed booking".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::ConcurrencyConflict("version mismatch".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::UnsupportedPriceMode("per_week".into()).error_code(),
            "unsupported_price_mode"
        );
        assert_eq!(
            AppError::ResourceUnavailable {
                conflicting: Uuid::nil()
            }
            .error_code(),
            "resource_unavailable"
        );
        assert_eq!(AppError::ResourceNotFound(7).error_code(), "resource_not_found");
    }

    #[test]
    fn test_conflicting_booking_named_in_message() {
        let id = Uuid::new_v4();
        let err = AppError::ResourceUnavailable { conflicting: id };
        assert!(err.to_string().contains(&id.to_string()));
    }
}
