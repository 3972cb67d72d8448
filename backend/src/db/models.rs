//! Query filters and aggregate rows exchanged with the repository layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::models::{
    BloodType, DemandEvent, Donor, GeoPoint, HospitalLocation, InventoryRecord, MovementRecord,
    UsageRecord,
};

/// Optional hospital / blood type restriction shared by most queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockFilter {
    pub hospital_id: Option<String>,
    pub blood_type: Option<BloodType>,
}

impl StockFilter {
    pub fn new(hospital_id: Option<String>, blood_type: Option<BloodType>) -> Self {
        Self {
            hospital_id,
            blood_type,
        }
    }

    pub fn matches(&self, hospital_id: &str, blood_type: BloodType) -> bool {
        self.hospital_id
            .as_deref()
            .map_or(true, |h| h == hospital_id)
            && self.blood_type.map_or(true, |b| b == blood_type)
    }
}

/// Movement-history restriction with an inclusive date window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub stock: StockFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MovementFilter {
    pub fn matches(&self, record: &MovementRecord) -> bool {
        self.stock.matches(&record.hospital_id, record.blood_type)
            && self.start_date.map_or(true, |d| record.movement_date >= d)
            && self.end_date.map_or(true, |d| record.movement_date <= d)
    }
}

/// Donor search restriction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonorFilter {
    pub blood_type: Option<BloodType>,
    pub is_available: Option<bool>,
}

impl DonorFilter {
    pub fn matches(&self, donor: &Donor) -> bool {
        self.blood_type.map_or(true, |b| b == donor.blood_type)
            && self.is_available.map_or(true, |a| a == donor.is_available)
    }
}

/// Usage aggregated per (hospital, blood type) since a cutoff date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub hospital_id: String,
    pub blood_type: BloodType,
    /// Mean of `units_used` over the matching usage records.
    pub avg_units_used: f64,
    /// Number of usage records behind the average.
    pub days_of_data: u64,
    pub peak_units_used: u32,
}

/// Movement totals per (hospital, blood type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementTotals {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub total_collected: u64,
    pub total_used: u64,
    pub total_expired: u64,
}
