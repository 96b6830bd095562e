//! Car handlers
//!
//! Read-only aggregate views plus the revenue repair endpoint.

use crate::dto::{ApiResponse, CarResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use carflow_core::{traits::CarRepository, AppError};
use carflow_db::PgCarRepository;
use carflow_services::PgRevenueAggregator;
use tracing::{info, instrument};

/// List cars
///
/// `GET /api/v1/cars`
#[instrument(skip(repo))]
pub async fn list_cars(
    repo: web::Data<PgCarRepository>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let pagination = query.into_inner().clamped();

    let cars = repo.list(pagination.limit(), pagination.offset()).await?;
    let responses: Vec<CarResponse> = cars.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// Fetch one car aggregate row
///
/// `GET /api/v1/cars/{id}`
#[instrument(skip(repo))]
pub async fn get_car(
    repo: web::Data<PgCarRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let car = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ResourceNotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(CarResponse::from(car))))
}

/// Rebuild a car's revenue fields from its booking history
///
/// `POST /api/v1/cars/{id}/revenue/recompute`
#[instrument(skip(aggregator))]
pub async fn recompute_car_revenue(
    aggregator: web::Data<PgRevenueAggregator>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    info!("Revenue recompute requested for car {}", id);

    let totals = aggregator.recompute_car(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(totals, "revenue recomputed")))
}

/// Configure car routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cars")
            .route("", web::get().to(list_cars))
            .route("/{id}", web::get().to(get_car))
            .route("/{id}/revenue/recompute", web::post().to(recompute_car_revenue)),
    );
}
