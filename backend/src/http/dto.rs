//! Data Transfer Objects for the HTTP API.
//!
//! Query and body types keep blood types and risk levels as raw text. A
//! value naming no known type or level is not an error: it is carried as
//! [`FilterValue::NoMatch`] and the endpoint answers with an empty result.
//! Every success body is wrapped in [`Success`], which adds
//! `status: "success"` and a `timestamp`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::AppError;
use crate::api::{
    BoundingBox, DonorSearch, DonorSearchHit, EmergencyRequest, GeoPoint, InventoryRecord,
    ShortagePrediction, DEFAULT_SEARCH_RADIUS_KM,
};
use crate::db::models::{MovementFilter, StockFilter};
use crate::models::{BloodType, RiskLevel};

/// How an optional blood type or risk level parameter restricts results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue<T> {
    /// Absent or blank.
    Any,
    Only(T),
    /// Names no known value; nothing matches.
    NoMatch,
}

impl<T: FromStr> FilterValue<T> {
    pub fn parse(raw: Option<&str>) -> Self {
        match param_text(raw) {
            None => FilterValue::Any,
            Some(text) => text.parse().map_or(FilterValue::NoMatch, FilterValue::Only),
        }
    }
}

impl<T> FilterValue<T> {
    /// `None` when nothing can match, otherwise the optional restriction.
    pub fn restriction(self) -> Option<Option<T>> {
        match self {
            FilterValue::Any => Some(None),
            FilterValue::Only(value) => Some(Some(value)),
            FilterValue::NoMatch => None,
        }
    }
}

/// Trimmed parameter text; blank counts as absent.
///
/// Form decoding turns an unescaped `+` into a space, so `?blood_type=O+`
/// arrives as `"O "`. A trailing space after a type letter is read back as
/// `+`.
fn param_text(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim_start();
    let text = raw.trim_end();
    if text.is_empty() {
        return None;
    }
    let plus_lost = raw.len() > text.len()
        && text.ends_with(|c: char| matches!(c.to_ascii_uppercase(), 'A' | 'B' | 'O'));
    Some(if plus_lost {
        format!("{}+", text)
    } else {
        text.to_string()
    })
}

/// Parse an optional blood type parameter.
pub fn parse_blood_type(raw: Option<&str>) -> FilterValue<BloodType> {
    FilterValue::parse(raw)
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn stock_filter(hospital_id: Option<String>, blood_type: Option<&str>) -> Option<StockFilter> {
    parse_blood_type(blood_type)
        .restriction()
        .map(|blood_type| StockFilter::new(non_blank(hospital_id), blood_type))
}

// =============================================================================
// Requests
// =============================================================================

/// Optional body of `POST /predict/shortage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortageRequest {
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
}

impl ShortageRequest {
    /// `None` when the blood type names no known type.
    pub fn filter(self) -> Option<StockFilter> {
        stock_filter(self.hospital_id, self.blood_type.as_deref())
    }
}

/// Query parameters for `GET /predict/risks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskQuery {
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
}

impl RiskQuery {
    pub fn stock(&self) -> Option<StockFilter> {
        stock_filter(self.hospital_id.clone(), self.blood_type.as_deref())
    }

    pub fn risk_level(&self) -> FilterValue<RiskLevel> {
        FilterValue::parse(self.risk_level.as_deref())
    }

    /// The filters as received, for echoing back.
    pub fn echo(&self) -> RiskFilters {
        RiskFilters {
            hospital_id: non_blank(self.hospital_id.clone()),
            blood_type: param_text(self.blood_type.as_deref()),
            risk_level: param_text(self.risk_level.as_deref()),
        }
    }
}

/// Body of `POST /match/emergency`. Every field is required; they are
/// optional here so the missing one can be named in the error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencyMatchBody {
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub blood_type_needed: Option<String>,
    #[serde(default)]
    pub units_needed: Option<u32>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub urgency_level: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing required field: {}", field)))
}

impl TryFrom<EmergencyMatchBody> for EmergencyRequest {
    type Error = AppError;

    fn try_from(body: EmergencyMatchBody) -> Result<Self, AppError> {
        Ok(EmergencyRequest {
            hospital_id: required(body.hospital_id, "hospital_id")?,
            blood_type_needed: required(body.blood_type_needed, "blood_type_needed")?,
            units_needed: required(body.units_needed, "units_needed")?,
            location: required(body.location, "location")?,
            urgency_level: required(body.urgency_level, "urgency_level")?,
        })
    }
}

/// Query parameters for `GET /match/donors`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonorSearchQuery {
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    /// `true` restricts to available donors; any other value to unavailable.
    #[serde(default)]
    pub is_available: Option<String>,
}

impl DonorSearchQuery {
    /// `None` when the blood type names no known type.
    pub fn search(self) -> Option<DonorSearch> {
        let blood_type = parse_blood_type(self.blood_type.as_deref()).restriction()?;
        let center = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };
        Some(DonorSearch {
            blood_type,
            center,
            radius_km: self.radius_km.unwrap_or(DEFAULT_SEARCH_RADIUS_KM),
            is_available: non_blank(self.is_available)
                .map(|v| v.eq_ignore_ascii_case("true")),
        })
    }
}

/// Query parameters for `GET /analytics/waste`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WasteQuery {
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    /// Inclusive, `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive, `YYYY-MM-DD`
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl WasteQuery {
    pub fn filter(self) -> Option<MovementFilter> {
        Some(MovementFilter {
            stock: stock_filter(self.hospital_id, self.blood_type.as_deref())?,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Query parameters for `GET /analytics/forecast`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastQuery {
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    /// Forecast horizon (default: 30)
    #[serde(default)]
    pub days: Option<u32>,
}

impl ForecastQuery {
    pub fn filter(&self) -> Option<StockFilter> {
        stock_filter(self.hospital_id.clone(), self.blood_type.as_deref())
    }
}

/// Query parameters for `GET /analytics/heatmap`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeatmapQuery {
    #[serde(default)]
    pub min_lat: Option<f64>,
    #[serde(default)]
    pub min_lng: Option<f64>,
    #[serde(default)]
    pub max_lat: Option<f64>,
    #[serde(default)]
    pub max_lng: Option<f64>,
    #[serde(default)]
    pub blood_type: Option<String>,
}

impl HeatmapQuery {
    /// The bounding box, only when all four bounds are given.
    pub fn bounds(&self) -> Option<BoundingBox> {
        Some(BoundingBox {
            min_lat: self.min_lat?,
            min_lng: self.min_lng?,
            max_lat: self.max_lat?,
            max_lng: self.max_lng?,
        })
    }
}

/// Query parameters for `GET /inventory`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryQuery {
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
}

impl InventoryQuery {
    pub fn filter(self) -> Option<StockFilter> {
        stock_filter(self.hospital_id, self.blood_type.as_deref())
    }
}

/// Body of `POST /inventory/update`. Fields are optional so the missing one
/// can be named in the error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryUpdateRequest {
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    /// Signed so that negative values get a readable 400.
    #[serde(default)]
    pub current_units: Option<i64>,
}

/// A validated inventory update.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryUpdate {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub current_units: u32,
}

impl TryFrom<InventoryUpdateRequest> for InventoryUpdate {
    type Error = AppError;

    /// Stock is keyed by known blood types, so an unknown type is rejected
    /// here rather than matching nothing.
    fn try_from(body: InventoryUpdateRequest) -> Result<Self, AppError> {
        let hospital_id = required(body.hospital_id, "hospital_id")?;
        let blood_type = required(body.blood_type, "blood_type")?
            .parse::<BloodType>()
            .map_err(AppError::BadRequest)?;
        let units = required(body.current_units, "current_units")?;
        let current_units = u32::try_from(units).map_err(|_| {
            AppError::BadRequest(format!(
                "current_units must be a non-negative integer, got {}",
                units
            ))
        })?;
        Ok(InventoryUpdate {
            hospital_id,
            blood_type,
            current_units,
        })
    }
}


// =============================================================================
// Responses
// =============================================================================

/// Success envelope: `{"status": "success", ...data, "timestamp": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Success<T> {
    pub status: String,
    #[serde(flatten)]
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> Success<T> {
    pub fn new(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "success".to_string(),
            data,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionsData {
    pub predictions: Vec<ShortagePrediction>,
    pub total_predictions: usize,
}

/// Filters echoed back by `GET /predict/risks`, as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFilters {
    pub hospital_id: Option<String>,
    pub blood_type: Option<String>,
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RisksData {
    pub risks: Vec<ShortagePrediction>,
    pub total_count: usize,
    pub filters: RiskFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorsData {
    pub donors: Vec<DonorSearchHit>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastsData {
    pub forecasts: Vec<crate::api::DemandForecast>,
    pub forecast_period_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryData {
    pub inventory: Vec<InventoryRecord>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryUpdated {
    pub message: String,
    pub updated: InventoryRecord,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_named() {
        let body = EmergencyMatchBody {
            hospital_id: Some("H001".into()),
            blood_type_needed: Some("O+".into()),
            units_needed: Some(2),
            location: None,
            urgency_level: Some("HIGH".into()),
        };
        match EmergencyRequest::try_from(body) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Missing required field: location"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let filter = InventoryQuery {
            hospital_id: Some("  ".into()),
            blood_type: Some(String::new()),
        }
        .filter();
        assert_eq!(filter, Some(StockFilter::default()));
    }

    #[test]
    fn test_unknown_blood_type_matches_nothing() {
        assert_eq!(parse_blood_type(Some("Z+")), FilterValue::NoMatch);
        assert_eq!(parse_blood_type(Some("ab-")), FilterValue::Only(BloodType::AbNegative));
        assert_eq!(parse_blood_type(None), FilterValue::Any);

        let query = InventoryQuery {
            hospital_id: Some("H001".into()),
            blood_type: Some("Z+".into()),
        };
        assert_eq!(query.filter(), None);
    }

    #[test]
    fn test_unescaped_plus_is_restored() {
        assert_eq!(parse_blood_type(Some("O ")), FilterValue::Only(BloodType::OPositive));
        assert_eq!(parse_blood_type(Some("ab ")), FilterValue::Only(BloodType::AbPositive));
        assert_eq!(parse_blood_type(Some(" B- ")), FilterValue::Only(BloodType::BNegative));
        assert_eq!(parse_blood_type(Some("O")), FilterValue::NoMatch);
    }

    #[test]
    fn test_risk_query_echoes_raw_filters() {
        let query = RiskQuery {
            hospital_id: Some("H001".into()),
            blood_type: Some("O ".into()),
            risk_level: Some("severe".into()),
        };
        assert_eq!(query.risk_level(), FilterValue::NoMatch);
        assert_eq!(
            query.echo(),
            RiskFilters {
                hospital_id: Some("H001".into()),
                blood_type: Some("O+".into()),
                risk_level: Some("severe".into()),
            }
        );
        assert_eq!(
            query.stock(),
            Some(StockFilter::new(Some("H001".into()), Some(BloodType::OPositive)))
        );
    }

    #[test]
    fn test_heatmap_bounds_need_all_four() {
        let mut q = HeatmapQuery {
            min_lat: Some(30.0),
            min_lng: Some(31.0),
            max_lat: Some(30.1),
            max_lng: None,
            blood_type: None,
        };
        assert!(q.bounds().is_none());
        q.max_lng = Some(31.5);
        assert!(q.bounds().is_some());
    }

    #[test]
    fn test_negative_units_rejected() {
        let req = InventoryUpdateRequest {
            hospital_id: Some("H001".into()),
            blood_type: Some("O+".into()),
            current_units: Some(-3),
        };
        assert!(matches!(InventoryUpdate::try_from(req), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_inventory_update_names_missing_field() {
        let req = InventoryUpdateRequest {
            hospital_id: Some("H001".into()),
            blood_type: Some("A-".into()),
            current_units: None,
        };
        match InventoryUpdate::try_from(req) {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Missing required field: current_units")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_success_envelope_flattens() {
        let now = Utc::now();
        let json = serde_json::to_value(Success::new(
            DonorsData {
                donors: Vec::new(),
                total_count: 0,
            },
            now,
        ))
        .unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["total_count"], 0);
        assert!(json["timestamp"].is_string());
    }
}
