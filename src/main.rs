//! CarFlow server
//!
//! Car-rental booking backend: booking lifecycle, conflict and pricing
//! engine, and the revenue aggregates derived from it.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use carflow_api::{configure_bookings, configure_cars, configure_customers};
use carflow_core::traits::SystemClock;
use carflow_core::AppConfig;
use carflow_db::{create_pool, PgBookingRepository, PgCarRepository, PgCustomerRepository};
use carflow_services::{LogNotifier, PgBookingManager};
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "carflow",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))
            // Booking lifecycle and projections
            .configure(configure_bookings)
            // Car aggregates and revenue repair
            .configure(configure_cars)
            // Customer aggregates
            .configure(configure_customers),
    );
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "carflow={},carflow_api={},carflow_services={},carflow_db={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting CarFlow v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, Some(config.database.max_connections))
        .await
        .expect("Failed to create database pool");

    // Repositories
    let bookings = Arc::new(PgBookingRepository::new(pool.clone()));
    let cars = Arc::new(PgCarRepository::new(pool.clone()));
    let customers = Arc::new(PgCustomerRepository::new(pool.clone()));

    // Booking engine
    let manager = PgBookingManager::new(
        Arc::clone(&bookings),
        Arc::clone(&cars),
        Arc::clone(&customers),
        Arc::new(LogNotifier),
        Arc::new(SystemClock),
        config.rental.clone(),
    );

    let aggregator = web::Data::new(manager.revenue());
    let manager = web::Data::new(manager);
    let rental_policy = web::Data::new(config.rental.clone());
    let bookings = web::Data::from(bookings);
    let cars = web::Data::from(cars);
    let customers = web::Data::from(customers);

    // CORS configuration
    let cors_origins = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        // Configure CORS - clone cors_origins for each worker
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Shared state
            .app_data(manager.clone())
            .app_data(aggregator.clone())
            .app_data(rental_policy.clone())
            .app_data(bookings.clone())
            .app_data(cars.clone())
            .app_data(customers.clone())
            // Middleware
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            // Configure routes
            .configure(configure_routes)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
