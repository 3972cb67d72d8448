//! Domain types shared by the store, the engines and the HTTP surface.

pub mod blood;
pub mod geo;
pub mod levels;
pub mod records;

pub use blood::{compatible_donor_codes, BloodType, Urgency};
pub use geo::{distance_km, GeoPoint, EARTH_RADIUS_KM};
pub use levels::{DemandTrend, RiskLevel, WasteStatus};
pub use records::{
    DemandEvent, Donor, HospitalLocation, InventoryRecord, MovementRecord, UsageRecord,
};
