//! Donor ranking score.
//!
//! The score is a weighted sum of four terms, scaled by the request urgency
//! and capped at 1.0:
//!
//! | term | weight | value |
//! |------|--------|-------|
//! | blood type | 0.4 | 1.0 exact, 0.7 compatible, 0.0 otherwise |
//! | distance | 0.3 | 1.0 ≤5 km, 0.7 ≤10 km, 0.4 ≤20 km, else `max(0.1, 1 - d/100)` |
//! | recency | 0.2 | 1.0 ≥90 days, 0.8 ≥56 days, 0.3 otherwise, 0.5 if unknown |
//! | base | 0.1 | always added |
//!
//! This is a heuristic ranking value, not a probability. The lower end is not
//! clamped: it stays non-negative only because every term and every urgency
//! multiplier is non-negative.

use chrono::NaiveDate;

use crate::models::{BloodType, Urgency};

pub const BLOOD_TYPE_WEIGHT: f64 = 0.4;
pub const DISTANCE_WEIGHT: f64 = 0.3;
pub const RECENCY_WEIGHT: f64 = 0.2;
pub const BASE_SCORE: f64 = 0.1;

/// Minimum safe interval between whole-blood donations.
pub const MIN_DONATION_INTERVAL_DAYS: i64 = 56;
/// Interval after which a donor is considered fully recovered.
pub const PREFERRED_DONATION_INTERVAL_DAYS: i64 = 90;

pub const LAST_DONATION_FORMAT: &str = "%Y-%m-%d";

pub fn blood_type_score(donor: BloodType, requested: BloodType) -> f64 {
    if donor == requested {
        1.0
    } else if donor.can_donate_to(requested) {
        0.7
    } else {
        0.0
    }
}

pub fn distance_score(distance_km: f64) -> f64 {
    if distance_km <= 5.0 {
        1.0
    } else if distance_km <= 10.0 {
        0.7
    } else if distance_km <= 20.0 {
        0.4
    } else {
        (1.0 - distance_km / 100.0).max(0.1)
    }
}

/// Recency term from the raw last-donation text.
///
/// Missing or unparseable dates score a neutral 0.5.
pub fn recency_score(last_donation_date: Option<&str>, today: NaiveDate) -> f64 {
    let Some(raw) = last_donation_date else {
        return 0.5;
    };
    let Ok(last) = NaiveDate::parse_from_str(raw.trim(), LAST_DONATION_FORMAT) else {
        return 0.5;
    };

    let days_since = (today - last).num_days();
    if days_since >= PREFERRED_DONATION_INTERVAL_DAYS {
        1.0
    } else if days_since >= MIN_DONATION_INTERVAL_DAYS {
        0.8
    } else {
        0.3
    }
}

/// Combined match score for one donor, capped at 1.0.
pub fn score_donor(
    donor_type: BloodType,
    requested_type: BloodType,
    distance_km: f64,
    last_donation_date: Option<&str>,
    urgency: Option<Urgency>,
    today: NaiveDate,
) -> f64 {
    let weighted = blood_type_score(donor_type, requested_type) * BLOOD_TYPE_WEIGHT
        + distance_score(distance_km) * DISTANCE_WEIGHT
        + recency_score(last_donation_date, today) * RECENCY_WEIGHT
        + BASE_SCORE;

    (weighted * Urgency::multiplier_for(urgency)).min(1.0)
}
