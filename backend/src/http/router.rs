//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::routes::{analytics, inventory, matching, prediction};

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Prediction
        .route(prediction::PREDICT_SHORTAGE, post(handlers::predict_shortage))
        .route(prediction::PREDICT_RISKS, get(handlers::get_risks))
        // Matching
        .route(matching::MATCH_EMERGENCY, post(handlers::match_emergency))
        .route(matching::MATCH_DONORS, get(handlers::search_donors))
        // Analytics
        .route(analytics::ANALYTICS_WASTE, get(handlers::get_waste_analysis))
        .route(analytics::ANALYTICS_FORECAST, get(handlers::get_demand_forecast))
        .route(analytics::ANALYTICS_HEATMAP, get(handlers::get_heatmap))
        // Inventory
        .route(inventory::INVENTORY, get(handlers::get_inventory))
        .route(inventory::INVENTORY_UPDATE, post(handlers::update_inventory));

    Router::new()
        .route(inventory::HEALTH, get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        .nest(inventory::API_PREFIX, api_v1)
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
