use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{BloodType, RiskLevel};

/// Shortage outlook for one (hospital, blood type) inventory line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortagePrediction {
    pub hospital_id: String,
    pub blood_type: BloodType,
    pub current_units: u32,
    /// Units per day actually used for the estimate (never zero).
    pub avg_daily_usage: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub expected_shortage_date: Option<NaiveDate>,
    pub days_to_shortage: Option<i64>,
}

pub const PREDICT_SHORTAGE: &str = "/predict/shortage";
pub const PREDICT_RISKS: &str = "/predict/risks";
