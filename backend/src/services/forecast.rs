//! Demand forecast from recent usage and upcoming events.

use chrono::{Duration, NaiveDate};
use log::debug;

use crate::algorithms::analytics::{event_adjustment, forecast_confidence};
use crate::algorithms::round_to;
use crate::api::DemandForecast;
use crate::db::models::StockFilter;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::DemandTrend;

/// Usage history behind the daily average.
pub const HISTORY_WINDOW_DAYS: i64 = 90;
/// Events in `[today, today + EVENT_WINDOW_DAYS]` adjust every forecast,
/// whatever the requested horizon.
pub const EVENT_WINDOW_DAYS: i64 = 30;

/// Forecast demand over the next `horizon_days` days for every
/// (hospital, blood type) with usage in the history window.
pub async fn forecast_demand<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &StockFilter,
    horizon_days: u32,
    today: NaiveDate,
) -> RepositoryResult<Vec<DemandForecast>> {
    let summaries = repo
        .usage_summaries(filter, today - Duration::days(HISTORY_WINDOW_DAYS))
        .await?;
    let impacts: Vec<f64> = repo
        .events_between(today, today + Duration::days(EVENT_WINDOW_DAYS))
        .await?
        .iter()
        .map(|e| e.impact_level)
        .collect();

    debug!(
        "Forecasting {} days for {} usage groups with {} upcoming events",
        horizon_days,
        summaries.len(),
        impacts.len()
    );

    Ok(summaries
        .into_iter()
        .map(|s| {
            let avg = s.avg_units_used;
            let forecast = avg * f64::from(horizon_days) + event_adjustment(avg, &impacts);
            DemandForecast {
                hospital_id: s.hospital_id,
                blood_type: s.blood_type,
                avg_daily_demand: round_to(avg, 2),
                forecast_units: round_to(forecast, 1),
                horizon_days,
                demand_trend: DemandTrend::Stable,
                peak_days: Vec::new(),
                days_of_data: s.days_of_data,
                peak_daily_usage: s.peak_units_used,
                confidence_level: forecast_confidence(s.days_of_data),
            }
        })
        .collect())
}
