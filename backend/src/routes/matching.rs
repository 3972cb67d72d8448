use serde::{Deserialize, Serialize};

use crate::models::{BloodType, Donor, GeoPoint};

/// A validated emergency request.
///
/// `blood_type_needed` and `urgency_level` stay as free text: an unknown
/// blood type simply finds no donors and an unknown urgency is neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub hospital_id: String,
    pub blood_type_needed: String,
    pub units_needed: u32,
    pub location: GeoPoint,
    pub urgency_level: String,
}

/// One ranked donor candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedDonor {
    pub donor_id: String,
    pub blood_type: BloodType,
    pub matching_score: f64,
    pub distance_km: f64,
    pub location: GeoPoint,
    pub last_donation_date: Option<String>,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyMatchResult {
    /// `REQ` + timestamp by default; not guaranteed unique.
    pub request_id: String,
    pub matched_donors: Vec<MatchedDonor>,
    pub total_matches: usize,
    pub urgency_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Donor search criteria. The radius only applies when `center` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorSearch {
    pub blood_type: Option<BloodType>,
    pub center: Option<GeoPoint>,
    pub radius_km: f64,
    pub is_available: Option<bool>,
}

impl Default for DonorSearch {
    fn default() -> Self {
        Self {
            blood_type: None,
            center: None,
            radius_km: DEFAULT_SEARCH_RADIUS_KM,
            is_available: None,
        }
    }
}

pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorSearchHit {
    #[serde(flatten)]
    pub donor: Donor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

pub const MATCH_EMERGENCY: &str = "/match/emergency";
pub const MATCH_DONORS: &str = "/match/donors";
