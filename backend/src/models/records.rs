//! Stored records: inventory, usage and movement history, donors and events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::blood::BloodType;
use super::geo::GeoPoint;

/// Current stock of one blood type at one hospital.
///
/// Unique per `(hospital_id, blood_type)`; updates are upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub current_units: u32,
    pub last_updated: DateTime<Utc>,
}

/// Units of one blood type used by a hospital on one day. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub date_of_usage: NaiveDate,
    pub units_used: u32,
}

/// A registered donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub donor_id: String,
    pub blood_type: BloodType,
    pub location: GeoPoint,
    /// Raw `YYYY-MM-DD` text as recorded; parsed only when scoring.
    pub last_donation_date: Option<String>,
    pub is_available: bool,
}

/// Collected/used/expired units for one day. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub movement_date: NaiveDate,
    pub units_collected: u32,
    pub units_used: u32,
    pub units_expired: u32,
}

/// A dated event that scales expected demand by `impact_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandEvent {
    pub event_name: String,
    pub event_date: NaiveDate,
    pub impact_level: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Registered coordinates of a hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalLocation {
    pub hospital_id: String,
    pub hospital_name: String,
    pub location: GeoPoint,
}
