//! HTTP handlers for the REST API.
//!
//! Each handler parses its input into domain types, reads the clock once and
//! delegates to the service layer. A blood type or risk level filter naming
//! no known value skips the service call and answers with an empty result.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;

use super::dto::{
    parse_blood_type, DonorSearchQuery, DonorsData, EmergencyMatchBody, ForecastQuery,
    ForecastsData, HealthResponse, HeatmapQuery, InventoryData, InventoryQuery, InventoryUpdate,
    InventoryUpdateRequest, InventoryUpdated, PredictionsData, RiskQuery, RisksData,
    ShortageRequest, Success, WasteQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{EmergencyMatchResult, EmergencyRequest, Heatmap, WasteReport, DEFAULT_FORECAST_DAYS};
use crate::db::services as db_services;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health, GET /api/health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Blood Bank API is running".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Prediction
// =============================================================================

/// POST /api/v1/predict/shortage
///
/// The body is optional; an empty body predicts for every inventory line.
pub async fn predict_shortage(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<Success<PredictionsData>> {
    let request: ShortageRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ShortageRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let now = Utc::now();
    let predictions = match request.filter() {
        Some(filter) => {
            services::predict_shortages(state.repository.as_ref(), &filter, now.date_naive())
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(Success::new(
        PredictionsData {
            total_predictions: predictions.len(),
            predictions,
        },
        now,
    )))
}

/// GET /api/v1/predict/risks
pub async fn get_risks(
    State(state): State<AppState>,
    query: Result<Query<RiskQuery>, QueryRejection>,
) -> HandlerResult<Success<RisksData>> {
    let Query(query) = query?;

    let now = Utc::now();
    let risks = match (query.stock(), query.risk_level().restriction()) {
        (Some(filter), Some(level)) => {
            let predictions =
                services::predict_shortages(state.repository.as_ref(), &filter, now.date_naive())
                    .await?;
            services::filter_by_risk(predictions, level)
        }
        _ => Vec::new(),
    };

    Ok(Json(Success::new(
        RisksData {
            total_count: risks.len(),
            risks,
            filters: query.echo(),
        },
        now,
    )))
}

// =============================================================================
// Matching
// =============================================================================

/// POST /api/v1/match/emergency
pub async fn match_emergency(
    State(state): State<AppState>,
    body: Result<Json<EmergencyMatchBody>, JsonRejection>,
) -> HandlerResult<Success<EmergencyMatchResult>> {
    let Json(body) = body?;
    let request = EmergencyRequest::try_from(body)?;

    let now = Utc::now();
    let result =
        services::match_donors(state.repository.as_ref(), &request, state.request_ids, now)
            .await?;
    tracing::info!(
        request_id = %result.request_id,
        hospital_id = %request.hospital_id,
        matches = result.total_matches,
        "Emergency match served"
    );

    Ok(Json(Success::new(result, now)))
}

/// GET /api/v1/match/donors
pub async fn search_donors(
    State(state): State<AppState>,
    query: Result<Query<DonorSearchQuery>, QueryRejection>,
) -> HandlerResult<Success<DonorsData>> {
    let Query(query) = query?;

    let donors = match query.search() {
        Some(search) => services::search_donors(state.repository.as_ref(), &search).await?,
        None => Vec::new(),
    };

    Ok(Json(Success::new(
        DonorsData {
            total_count: donors.len(),
            donors,
        },
        Utc::now(),
    )))
}

// =============================================================================
// Analytics
// =============================================================================

/// GET /api/v1/analytics/waste
pub async fn get_waste_analysis(
    State(state): State<AppState>,
    query: Result<Query<WasteQuery>, QueryRejection>,
) -> HandlerResult<Success<WasteReport>> {
    let Query(query) = query?;

    let report = match query.filter() {
        Some(filter) => services::analyze_waste(state.repository.as_ref(), &filter).await?,
        None => services::waste::summarize(&[]),
    };
    Ok(Json(Success::new(report, Utc::now())))
}

/// GET /api/v1/analytics/forecast
pub async fn get_demand_forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> HandlerResult<Success<ForecastsData>> {
    let Query(query) = query?;
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);

    let now = Utc::now();
    let forecasts = match query.filter() {
        Some(filter) => {
            services::forecast_demand(state.repository.as_ref(), &filter, days, now.date_naive())
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(Success::new(
        ForecastsData {
            forecasts,
            forecast_period_days: days,
        },
        now,
    )))
}

/// GET /api/v1/analytics/heatmap
pub async fn get_heatmap(
    State(state): State<AppState>,
    query: Result<Query<HeatmapQuery>, QueryRejection>,
) -> HandlerResult<Success<Heatmap>> {
    let Query(query) = query?;

    let now = Utc::now();
    let heatmap = match parse_blood_type(query.blood_type.as_deref()).restriction() {
        Some(blood_type) => {
            services::build_heatmap(state.repository.as_ref(), blood_type, query.bounds(), now)
                .await?
        }
        None => Heatmap::empty(now),
    };
    Ok(Json(Success::new(heatmap, now)))
}

// =============================================================================
// Inventory
// =============================================================================

/// GET /api/v1/inventory
pub async fn get_inventory(
    State(state): State<AppState>,
    query: Result<Query<InventoryQuery>, QueryRejection>,
) -> HandlerResult<Success<InventoryData>> {
    let Query(query) = query?;

    let inventory = match query.filter() {
        Some(filter) => db_services::list_inventory(state.repository.as_ref(), &filter).await?,
        None => Vec::new(),
    };
    Ok(Json(Success::new(
        InventoryData {
            total_count: inventory.len(),
            inventory,
        },
        Utc::now(),
    )))
}

/// POST /api/v1/inventory/update
pub async fn update_inventory(
    State(state): State<AppState>,
    body: Result<Json<InventoryUpdateRequest>, JsonRejection>,
) -> HandlerResult<Success<InventoryUpdated>> {
    let Json(body) = body?;
    let update = InventoryUpdate::try_from(body)?;

    let now = Utc::now();
    let updated = db_services::update_inventory(
        state.repository.as_ref(),
        &update.hospital_id,
        update.blood_type,
        update.current_units,
        now,
    )
    .await?;

    Ok(Json(Success::new(
        InventoryUpdated {
            message: "Inventory updated successfully".to_string(),
            updated,
        },
        now,
    )))
}

// =============================================================================
// Fallback
// =============================================================================

/// Any unmatched route.
pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
