//! Days-to-exhaustion and risk tier for a single inventory line.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::RiskLevel;

/// A shortage date is only projected inside this horizon.
pub const SHORTAGE_HORIZON_DAYS: f64 = 30.0;

/// Outcome of [`estimate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortageEstimate {
    /// Usage rate actually applied (zero usage is replaced by one unit/day).
    pub effective_daily_usage: f64,
    pub days_remaining: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub shortage_date: Option<NaiveDate>,
    pub days_to_shortage: Option<i64>,
}

/// Risk score and tier for a given number of days of stock left.
pub fn risk_for_days(days_remaining: f64) -> (f64, RiskLevel) {
    if days_remaining <= 3.0 {
        ((0.90 + (3.0 - days_remaining) * 0.033).min(1.0), RiskLevel::Critical)
    } else if days_remaining <= 7.0 {
        (0.60 + (7.0 - days_remaining) * 0.075, RiskLevel::High)
    } else if days_remaining <= 14.0 {
        (0.30 + (14.0 - days_remaining) * 0.043, RiskLevel::Medium)
    } else {
        ((30.0 / days_remaining).min(0.30).max(0.10), RiskLevel::Low)
    }
}

/// Estimate when `current_units` run out at `avg_daily_usage` units per day.
///
/// No usage history (an average of zero) is treated as one unit per day,
/// which biases lines without history toward "not urgent".
pub fn estimate(current_units: u32, avg_daily_usage: f64, today: NaiveDate) -> ShortageEstimate {
    let effective_daily_usage = if avg_daily_usage == 0.0 {
        1.0
    } else {
        avg_daily_usage
    };

    let days_remaining = f64::from(current_units) / effective_daily_usage;
    let (risk_score, risk_level) = risk_for_days(days_remaining);

    let (shortage_date, days_to_shortage) = if days_remaining < SHORTAGE_HORIZON_DAYS {
        let whole_days = days_remaining.trunc() as i64;
        (today.checked_add_signed(Duration::days(whole_days)), Some(whole_days))
    } else {
        (None, None)
    };

    ShortageEstimate {
        effective_daily_usage,
        days_remaining,
        risk_score,
        risk_level,
        shortage_date,
        days_to_shortage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
    }

    #[test]
    fn test_five_days_is_high() {
        let e = estimate(15, 3.0, today());
        assert_eq!(e.days_remaining, 5.0);
        assert_eq!(e.risk_level, RiskLevel::High);
        assert!((e.risk_score - 0.75).abs() < 1e-9);
        assert_eq!(e.shortage_date, NaiveDate::from_ymd_opt(2024, 2, 20));
        assert_eq!(e.days_to_shortage, Some(5));
    }

    #[test]
    fn test_two_days_is_critical() {
        let e = estimate(8, 4.0, today());
        assert_eq!(e.days_remaining, 2.0);
        assert_eq!(e.risk_level, RiskLevel::Critical);
        assert!((e.risk_score - 0.933).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stock_is_critical() {
        let e = estimate(0, 10.0, today());
        assert_eq!(e.risk_level, RiskLevel::Critical);
        assert!((e.risk_score - 0.999).abs() < 1e-9);
        assert_eq!(e.shortage_date, Some(today()));
    }

    #[test]
    fn test_medium_tier() {
        let e = estimate(40, 4.0, today());
        assert_eq!(e.risk_level, RiskLevel::Medium);
        assert!((e.risk_score - (0.30 + 4.0 * 0.043)).abs() < 1e-9);
    }

    #[test]
    fn test_low_tier_bounds() {
        // 20 days: 30/20 = 1.5 -> capped to 0.30
        let e = estimate(40, 2.0, today());
        assert_eq!(e.risk_level, RiskLevel::Low);
        assert!((e.risk_score - 0.30).abs() < 1e-12);

        // 400 days: 30/400 = 0.075 -> floored to 0.10
        let e = estimate(400, 1.0, today());
        assert!((e.risk_score - 0.10).abs() < 1e-12);
        assert_eq!(e.shortage_date, None);
        assert_eq!(e.days_to_shortage, None);
    }

    #[test]
    fn test_zero_usage_substitutes_one_unit_per_day() {
        let e = estimate(12, 0.0, today());
        assert_eq!(e.effective_daily_usage, 1.0);
        assert_eq!(e.days_remaining, 12.0);
        assert_eq!(e.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_fractional_days_are_truncated_for_shortage_date() {
        let e = estimate(10, 3.0, today());
        assert_eq!(e.days_to_shortage, Some(3));
        assert_eq!(e.shortage_date, NaiveDate::from_ymd_opt(2024, 2, 18));
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(risk_for_days(3.0).1, RiskLevel::Critical);
        assert_eq!(risk_for_days(7.0).1, RiskLevel::High);
        assert_eq!(risk_for_days(14.0).1, RiskLevel::Medium);
        assert_eq!(risk_for_days(14.01).1, RiskLevel::Low);
    }
}
