//! Shortage prediction over current inventory.

use chrono::{Duration, NaiveDate};
use log::debug;
use std::collections::HashMap;

use crate::algorithms::{round_to, shortage};
use crate::api::ShortagePrediction;
use crate::db::models::{BloodType, StockFilter};
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::RiskLevel;

/// Trailing window of usage history behind the daily average.
pub const USAGE_WINDOW_DAYS: i64 = 30;

/// Predict shortages for every inventory line matching `filter`.
///
/// Each line is joined with its mean units per usage record over the
/// trailing [`USAGE_WINDOW_DAYS`]; lines without usage count as zero usage.
pub async fn predict_shortages<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &StockFilter,
    today: NaiveDate,
) -> RepositoryResult<Vec<ShortagePrediction>> {
    let inventory = repo.list_inventory(filter).await?;
    let since = today - Duration::days(USAGE_WINDOW_DAYS);
    let usage: HashMap<(String, BloodType), f64> = repo
        .usage_summaries(filter, since)
        .await?
        .into_iter()
        .map(|s| ((s.hospital_id, s.blood_type), s.avg_units_used))
        .collect();

    debug!(
        "Predicting shortages for {} inventory lines ({} with recent usage)",
        inventory.len(),
        usage.len()
    );

    Ok(inventory
        .into_iter()
        .map(|line| {
            let avg = usage
                .get(&(line.hospital_id.clone(), line.blood_type))
                .copied()
                .unwrap_or(0.0);
            let est = shortage::estimate(line.current_units, avg, today);
            ShortagePrediction {
                hospital_id: line.hospital_id,
                blood_type: line.blood_type,
                current_units: line.current_units,
                avg_daily_usage: round_to(est.effective_daily_usage, 2),
                risk_score: round_to(est.risk_score, 2),
                risk_level: est.risk_level,
                expected_shortage_date: est.shortage_date,
                days_to_shortage: est.days_to_shortage,
            }
        })
        .collect())
}

/// Keep only predictions at `level`; `None` keeps everything.
pub fn filter_by_risk(
    predictions: Vec<ShortagePrediction>,
    level: Option<RiskLevel>,
) -> Vec<ShortagePrediction> {
    match level {
        Some(level) => predictions
            .into_iter()
            .filter(|p| p.risk_level == level)
            .collect(),
        None => predictions,
    }
}
