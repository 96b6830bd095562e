//! Booking handlers
//!
//! HTTP handlers for the booking lifecycle and the read-only projections.

use crate::dto::{
    ActionRequest, ApiResponse, BookingDecision, BookingQueryParams, BookingResponse,
    CreateBookingRequest, StatusEvent, StatusEventRequest,
};
use actix_web::{web, HttpResponse};
use carflow_core::{config::RentalConfig, models::BookingStateFilter, traits::BookingRepository, AppError};
use carflow_db::PgBookingRepository;
use carflow_services::PgBookingManager;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Create a booking
///
/// `POST /api/v1/bookings`
#[instrument(skip(manager, body))]
pub async fn create_booking(
    manager: web::Data<PgBookingManager>,
    body: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.to_request()?;
    debug!("Creating booking on car {}", request.car_id);

    let booking = manager.request_booking(request).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Decide a pending booking
///
/// `PUT /api/v1/bookings/{id}/action`
#[instrument(skip(manager, body))]
pub async fn decide_booking(
    manager: web::Data<PgBookingManager>,
    path: web::Path<Uuid>,
    body: web::Json<ActionRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let booking = match body.decision()? {
        BookingDecision::Approve => manager.approve(id).await?,
        BookingDecision::Reject => manager.reject(id).await?,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Drive an approved booking through its lifecycle
///
/// `PUT /api/v1/bookings/{id}/status`
#[instrument(skip(manager, body))]
pub async fn transition_booking(
    manager: web::Data<PgBookingManager>,
    path: web::Path<Uuid>,
    body: web::Json<StatusEventRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let booking = match body.event()? {
        StatusEvent::Return(returned_at) => manager.return_car(id, returned_at).await?,
        StatusEvent::Complete => manager.complete(id).await?,
        StatusEvent::Cancel => manager.cancel(id).await?,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Fetch one booking
///
/// `GET /api/v1/bookings/{id}`
#[instrument(skip(repo))]
pub async fn get_booking(
    repo: web::Data<PgBookingRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let booking = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::BookingNotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// List bookings by state class or customer
///
/// `GET /api/v1/bookings?state=ongoing|completed|recent|all`
/// `GET /api/v1/bookings?customer_id=...`
#[instrument(skip(repo, policy))]
pub async fn list_bookings(
    repo: web::Data<PgBookingRepository>,
    policy: web::Data<RentalConfig>,
    query: web::Query<BookingQueryParams>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing bookings with filters: {:?}", query);

    let pagination = query.pagination();

    let bookings = if let Some(customer_id) = query.customer_id {
        let all = repo.list_for_customer(customer_id).await?;
        all.into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect()
    } else {
        let filter = query.state_filter()?;
        let limit = match filter {
            BookingStateFilter::Recent => policy.recent_limit,
            _ => pagination.limit(),
        };
        let offset = match filter {
            BookingStateFilter::Recent => 0,
            _ => pagination.offset(),
        };
        repo.list_by_state(filter, limit, offset).await?
    };

    let responses: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking))
            .route("", web::get().to(list_bookings))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/action", web::put().to(decide_booking))
            .route("/{id}/status", web::put().to(transition_booking)),
    );
}
