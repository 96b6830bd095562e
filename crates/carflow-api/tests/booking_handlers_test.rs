//! Integration tests for booking API DTOs
//!
//! These exercise the request parsing and response conversion layer
//! without a live database.

#[cfg(test)]
mod tests {
    use carflow_api::dto::{
        ActionRequest, ApiResponse, BookingDecision, BookingQueryParams, BookingResponse,
        CreateBookingRequest, StatusEvent, StatusEventRequest,
    };
    use carflow_core::models::{Booking, BookingStateFilter, PriceMode};
    use carflow_core::AppError;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn window_start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_create_request_conversion() {
        let body = CreateBookingRequest {
            car_id: 1,
            customer_id: 10,
            window_start: window_start(),
            window_end: window_start() + Duration::days(2),
            price_mode: "per_day".to_string(),
        };

        let request = body.to_request().unwrap();
        assert_eq!(request.car_id, 1);
        assert_eq!(request.price_mode, PriceMode::PerDay);
    }

    #[test]
    fn test_create_request_rejects_unknown_mode() {
        let body = CreateBookingRequest {
            car_id: 1,
            customer_id: 10,
            window_start: window_start(),
            window_end: window_start() + Duration::days(2),
            price_mode: "per_week".to_string(),
        };

        assert!(matches!(
            body.to_request().unwrap_err(),
            AppError::UnsupportedPriceMode(_)
        ));
    }

    #[test]
    fn test_create_request_validates_ids() {
        let body = CreateBookingRequest {
            car_id: 0,
            customer_id: 10,
            window_start: window_start(),
            window_end: window_start() + Duration::days(2),
            price_mode: "per_day".to_string(),
        };

        assert!(matches!(
            body.to_request().unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn test_action_request_parsing() {
        let approve = ActionRequest {
            action: "approve".to_string(),
        };
        assert_eq!(approve.decision().unwrap(), BookingDecision::Approve);

        let reject = ActionRequest {
            action: "REJECT".to_string(),
        };
        assert_eq!(reject.decision().unwrap(), BookingDecision::Reject);

        let bogus = ActionRequest {
            action: "postpone".to_string(),
        };
        assert!(matches!(
            bogus.decision().unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn test_status_event_parsing() {
        let returned_at = window_start() + Duration::days(2);

        let ret = StatusEventRequest {
            event: "return".to_string(),
            returned_at: Some(returned_at),
        };
        assert_eq!(ret.event().unwrap(), StatusEvent::Return(returned_at));

        let ret_without_time = StatusEventRequest {
            event: "return".to_string(),
            returned_at: None,
        };
        assert!(matches!(
            ret_without_time.event().unwrap_err(),
            AppError::MissingField(_)
        ));

        let complete = StatusEventRequest {
            event: "complete".to_string(),
            returned_at: None,
        };
        assert_eq!(complete.event().unwrap(), StatusEvent::Complete);

        let cancel = StatusEventRequest {
            event: "cancel".to_string(),
            returned_at: None,
        };
        assert_eq!(cancel.event().unwrap(), StatusEvent::Cancel);

        let bogus = StatusEventRequest {
            event: "teleport".to_string(),
            returned_at: None,
        };
        assert!(matches!(bogus.event().unwrap_err(), AppError::Validation(_)));
    }

    #[test]
    fn test_query_params_state_filter() {
        let query = BookingQueryParams {
            state: Some("ongoing".to_string()),
            ..Default::default()
        };
        assert_eq!(query.state_filter().unwrap(), BookingStateFilter::Ongoing);

        let query = BookingQueryParams::default();
        assert_eq!(query.state_filter().unwrap(), BookingStateFilter::All);

        let query = BookingQueryParams {
            state: Some("stale".to_string()),
            ..Default::default()
        };
        assert!(query.state_filter().is_err());
    }

    #[test]
    fn test_query_params_pagination() {
        let query = BookingQueryParams {
            page: Some(3),
            per_page: Some(20),
            ..Default::default()
        };
        let pagination = query.pagination();
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);

        let defaults = BookingQueryParams::default().pagination();
        assert_eq!(defaults.offset(), 0);
        assert_eq!(defaults.limit(), 50);
    }

    #[test]
    fn test_booking_response_conversion() {
        let booking = Booking::new(
            7,
            42,
            window_start() - Duration::hours(1),
            window_start(),
            window_start() + Duration::days(2),
            PriceMode::PerDay,
            2,
            dec!(2000),
        );
        let id = booking.id;

        let response = BookingResponse::from(booking);
        assert_eq!(response.id, id);
        assert_eq!(response.car_id, 7);
        assert_eq!(response.customer_id, 42);
        assert_eq!(response.price_mode, "per_day");
        assert_eq!(response.action, "pending");
        assert_eq!(response.status, "pending");
        assert_eq!(response.total_price, dec!(2000));
        assert_eq!(response.overdue_amount, None);
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::success(vec![1, 2, 3]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"data\":[1,2,3]"));
        assert!(!json.contains("message"));

        let response = ApiResponse::with_message(0, "recomputed");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"message\":\"recomputed\""));
    }
}
