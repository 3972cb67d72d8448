//! Public API surface: every response and request type the HTTP layer
//! serializes, gathered in one place.

pub use crate::routes::analytics::{
    BoundingBox, DemandForecast, Heatmap, HeatmapArea, HeatmapMetadata, WasteRate, WasteReport,
    DEFAULT_FORECAST_DAYS,
};
pub use crate::routes::matching::{
    DonorSearch, DonorSearchHit, EmergencyMatchResult, EmergencyRequest, MatchedDonor,
    DEFAULT_SEARCH_RADIUS_KM,
};
pub use crate::routes::prediction::ShortagePrediction;

pub use crate::models::{
    BloodType, DemandTrend, Donor, GeoPoint, InventoryRecord, RiskLevel, Urgency, WasteStatus,
};
