//! # Routes
//!
//! Axum router configuration for the rental API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Payments:
///   - POST /api/payments/order - Create a Razorpay order
///
/// - Catalog:
///   - GET  /api/equipment?q=&category= - Filter listings
///   - GET  /api/equipment/{id} - Get listing by ID
///   - GET  /api/categories - Category selector options
///   - GET  /api/plans - Rental plans
///
/// - Health:
///   - GET /health, GET /
pub fn create_router(state: AppState) -> Router {
    // The storefront may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new().route("/order", post(handlers::create_payment_order));

    let catalog_routes = Router::new()
        .route("/equipment", get(handlers::list_equipment))
        .route("/equipment/{equipment_id}", get(handlers::get_equipment))
        .route("/categories", get(handlers::list_categories))
        .route("/plans", get(handlers::list_plans));

    let api_routes = Router::new()
        .nest("/payments", payment_routes)
        .merge(catalog_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
