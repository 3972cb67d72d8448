//! Closed-form formulas behind the waste, forecast and heatmap reports.

use crate::models::{RiskLevel, WasteStatus};

/// Waste rates above this get a per-group recommendation.
pub const HIGH_WASTE_THRESHOLD: f64 = 0.15;
/// A mean group waste rate above this gets an overall recommendation.
pub const MEAN_WASTE_THRESHOLD: f64 = 0.10;

/// Units on hand at which a hospital's demand score bottoms out.
pub const DEMAND_REFERENCE_UNITS: f64 = 50.0;

/// Expired share of collected units.
///
/// One unit is added to the denominator so groups with no collections do not
/// divide by zero.
pub fn waste_rate(units_expired: u64, units_collected: u64) -> f64 {
    units_expired as f64 / (units_collected as f64 + 1.0)
}

pub fn waste_status(rate: f64) -> WasteStatus {
    if rate < 0.05 {
        WasteStatus::Low
    } else if rate < 0.10 {
        WasteStatus::Acceptable
    } else if rate < 0.20 {
        WasteStatus::High
    } else {
        WasteStatus::Critical
    }
}

/// Extra units expected because of events, summed over `impact_levels`.
///
/// An impact of 1.0 is neutral; 1.5 adds half a day of average demand.
pub fn event_adjustment(avg_daily_demand: f64, impact_levels: &[f64]) -> f64 {
    impact_levels
        .iter()
        .map(|impact| avg_daily_demand * (impact - 1.0))
        .sum()
}

/// Forecast confidence from the number of usage records behind the average.
pub fn forecast_confidence(days_of_data: u64) -> f64 {
    if days_of_data > 60 {
        0.85
    } else {
        0.65
    }
}

/// Demand pressure of a hospital's stock, in `[0.1, 1.0]`.
pub fn demand_score(current_units: u32) -> f64 {
    (1.0 - f64::from(current_units) / DEMAND_REFERENCE_UNITS).max(0.1)
}

/// Heatmap tier from demand pressure and available donor count.
pub fn area_risk(demand_score: f64, donor_density: usize) -> RiskLevel {
    if demand_score >= 0.9 || donor_density < 5 {
        RiskLevel::Critical
    } else if demand_score >= 0.75 || donor_density < 10 {
        RiskLevel::High
    } else if demand_score >= 0.5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
