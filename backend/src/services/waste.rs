//! Waste analysis over inventory movements.

use log::debug;

use crate::algorithms::analytics::{
    waste_rate, waste_status, HIGH_WASTE_THRESHOLD, MEAN_WASTE_THRESHOLD,
};
use crate::algorithms::round_to;
use crate::api::{WasteRate, WasteReport};
use crate::db::models::{MovementFilter, MovementTotals};
use crate::db::repository::{FullRepository, RepositoryResult};

pub const OVERALL_WASTE_RECOMMENDATION: &str =
    "Overall waste rate is above acceptable threshold. Review inventory management practices.";
pub const WASTE_OK_RECOMMENDATION: &str = "Waste rates are within acceptable limits.";

/// Waste rates per (hospital, blood type) for the movements matching `filter`.
pub async fn analyze_waste<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &MovementFilter,
) -> RepositoryResult<WasteReport> {
    let totals = repo.movement_totals(filter).await?;
    debug!("Analyzing waste over {} movement groups", totals.len());
    Ok(summarize(&totals))
}

/// Build the report from grouped totals. Pure.
pub fn summarize(totals: &[MovementTotals]) -> WasteReport {
    if totals.is_empty() {
        return WasteReport {
            waste_rates: Vec::new(),
            overall_waste_rate: 0.0,
            total_expired_units: 0,
            total_collected_units: 0,
            recommendations: Vec::new(),
        };
    }

    let rates: Vec<f64> = totals
        .iter()
        .map(|t| waste_rate(t.total_expired, t.total_collected))
        .collect();

    let waste_rates = totals
        .iter()
        .zip(&rates)
        .map(|(t, &rate)| WasteRate {
            hospital_id: t.hospital_id.clone(),
            blood_type: t.blood_type,
            waste_rate: round_to(rate, 3),
            units_expired: t.total_expired,
            total_units: t.total_collected,
            status: waste_status(rate),
        })
        .collect();

    let total_expired_units: u64 = totals.iter().map(|t| t.total_expired).sum();
    let total_collected_units: u64 = totals.iter().map(|t| t.total_collected).sum();

    WasteReport {
        waste_rates,
        overall_waste_rate: round_to(waste_rate(total_expired_units, total_collected_units), 3),
        total_expired_units,
        total_collected_units,
        recommendations: recommendations(totals, &rates),
    }
}

/// Free-text advice; `rates` are the unrounded rates, aligned with `totals`.
fn recommendations(totals: &[MovementTotals], rates: &[f64]) -> Vec<String> {
    let mut out: Vec<String> = totals
        .iter()
        .zip(rates)
        .filter(|&(_, &rate)| rate > HIGH_WASTE_THRESHOLD)
        .map(|(t, rate)| {
            format!(
                "High waste rate ({:.1}%) for {} at {}. Consider reducing collection or improving inventory rotation.",
                rate * 100.0,
                t.blood_type,
                t.hospital_id
            )
        })
        .collect();

    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    if mean > MEAN_WASTE_THRESHOLD {
        out.push(OVERALL_WASTE_RECOMMENDATION.to_string());
    }

    if out.is_empty() {
        out.push(WASTE_OK_RECOMMENDATION.to_string());
    }
    out
}
