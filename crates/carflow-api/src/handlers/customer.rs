//! Customer handlers

use crate::dto::{ApiResponse, CustomerResponse};
use actix_web::{web, HttpResponse};
use carflow_core::{traits::CustomerRepository, AppError};
use carflow_db::PgCustomerRepository;
use carflow_services::PgRevenueAggregator;
use tracing::{info, instrument};

/// Fetch one customer aggregate row
///
/// `GET /api/v1/customers/{id}`
#[instrument(skip(repo))]
pub async fn get_customer(
    repo: web::Data<PgCustomerRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let customer = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::CustomerNotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(CustomerResponse::from(customer))))
}

/// Rebuild a customer's revenue fields from their booking history
///
/// `POST /api/v1/customers/{id}/revenue/recompute`
#[instrument(skip(aggregator))]
pub async fn recompute_customer_revenue(
    aggregator: web::Data<PgRevenueAggregator>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    info!("Revenue recompute requested for customer {}", id);

    let totals = aggregator.recompute_customer(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(totals, "revenue recomputed")))
}

/// Configure customer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("/{id}", web::get().to(get_customer))
            .route(
                "/{id}/revenue/recompute",
                web::post().to(recompute_customer_revenue),
            ),
    );
}
