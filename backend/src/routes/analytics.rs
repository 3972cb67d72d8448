use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BloodType, DemandTrend, GeoPoint, RiskLevel, WasteStatus};

// =========================================================
// Waste
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteRate {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub waste_rate: f64,
    pub units_expired: u64,
    /// Units collected over the window.
    pub total_units: u64,
    pub status: WasteStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteReport {
    pub waste_rates: Vec<WasteRate>,
    pub overall_waste_rate: f64,
    pub total_expired_units: u64,
    pub total_collected_units: u64,
    pub recommendations: Vec<String>,
}

// =========================================================
// Forecast
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub avg_daily_demand: f64,
    /// Expected units over `horizon_days`, event adjustment included.
    pub forecast_units: f64,
    pub horizon_days: u32,
    pub demand_trend: DemandTrend,
    pub peak_days: Vec<NaiveDate>,
    pub days_of_data: u64,
    pub peak_daily_usage: u32,
    pub confidence_level: f64,
}

pub const DEFAULT_FORECAST_DAYS: u32 = 30;

// =========================================================
// Heatmap
// =========================================================

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lng..=self.max_lng).contains(&point.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapArea {
    pub area_id: String,
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub location: GeoPoint,
    pub demand_score: f64,
    pub donor_density: usize,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapMetadata {
    pub total_areas: usize,
    pub high_risk_areas: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub areas: Vec<HeatmapArea>,
    pub metadata: HeatmapMetadata,
}

impl Heatmap {
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            areas: Vec::new(),
            metadata: HeatmapMetadata {
                total_areas: 0,
                high_risk_areas: 0,
                generated_at,
            },
        }
    }
}

pub const ANALYTICS_WASTE: &str = "/analytics/waste";
pub const ANALYTICS_FORECAST: &str = "/analytics/forecast";
pub const ANALYTICS_HEATMAP: &str = "/analytics/heatmap";
