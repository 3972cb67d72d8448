//! Emergency donor matching and donor search.

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::str::FromStr;

use crate::algorithms::{round_to, score_donor};
use crate::api::{DonorSearch, DonorSearchHit, EmergencyMatchResult, EmergencyRequest, MatchedDonor};
use crate::db::models::{BloodType, Donor, DonorFilter};
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::Urgency;

/// Upper bound on the number of donors returned per request.
pub const MAX_MATCHES: usize = 10;

pub const NO_DONORS_MESSAGE: &str = "No available donors found";

/// How emergency request ids are generated.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RequestIdStrategy {
    /// `REQ` + `YYYYMMDDHHMMSS`; two requests in the same second share an id.
    #[default]
    Timestamp,
    /// `REQ-` + a random v4 UUID.
    Uuid,
}

impl FromStr for RequestIdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timestamp" => Ok(Self::Timestamp),
            "uuid" => Ok(Self::Uuid),
            _ => Err(format!("Unknown request id strategy: {}", s)),
        }
    }
}

impl RequestIdStrategy {
    /// Read `REQUEST_ID_STRATEGY`, defaulting to [`RequestIdStrategy::Timestamp`].
    pub fn from_env() -> Self {
        std::env::var("REQUEST_ID_STRATEGY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn generate(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::Timestamp => format!("REQ{}", now.format("%Y%m%d%H%M%S")),
            Self::Uuid => format!("REQ-{}", uuid::Uuid::new_v4()),
        }
    }
}

/// Number of donors to return for a request of `units_needed` units.
pub fn match_limit(units_needed: u32) -> usize {
    (units_needed as usize).saturating_mul(2).min(MAX_MATCHES)
}

/// Score, rank and truncate candidate donors for `request`.
///
/// Ranking is a stable sort on the score, so equal scores keep the order
/// the candidates came in.
pub fn rank_donors(
    candidates: Vec<Donor>,
    requested: BloodType,
    request: &EmergencyRequest,
    now: DateTime<Utc>,
) -> Vec<MatchedDonor> {
    let urgency = request.urgency_level.parse::<Urgency>().ok();
    let today = now.date_naive();

    let mut scored: Vec<(f64, f64, Donor)> = candidates
        .into_iter()
        .map(|donor| {
            let distance = request.location.distance_km(&donor.location);
            let score = score_donor(
                donor.blood_type,
                requested,
                distance,
                donor.last_donation_date.as_deref(),
                urgency,
                today,
            );
            (score, distance, donor)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(match_limit(request.units_needed));

    scored
        .into_iter()
        .map(|(score, distance, donor)| MatchedDonor {
            donor_id: donor.donor_id,
            blood_type: donor.blood_type,
            matching_score: round_to(score, 2),
            distance_km: round_to(distance, 2),
            location: donor.location,
            last_donation_date: donor.last_donation_date,
            is_available: donor.is_available,
        })
        .collect()
}

/// Match available, compatible donors to an emergency request.
///
/// No candidates is a normal outcome: the result is empty and carries
/// [`NO_DONORS_MESSAGE`].
pub async fn match_donors<R: FullRepository + ?Sized>(
    repo: &R,
    request: &EmergencyRequest,
    id_strategy: RequestIdStrategy,
    now: DateTime<Utc>,
) -> RepositoryResult<EmergencyMatchResult> {
    let request_id = id_strategy.generate(now);

    // An unknown requested type is compatible only with itself, so it can
    // never match a stored donor.
    let requested = request.blood_type_needed.parse::<BloodType>().ok();
    let candidates = match requested {
        Some(bt) => repo.find_available_donors(bt.compatible_donors()).await?,
        None => Vec::new(),
    };

    let requested = match requested {
        Some(bt) if !candidates.is_empty() => bt,
        _ => {
            info!(
                "Request {}: no available donors for {} at {}",
                request_id, request.blood_type_needed, request.hospital_id
            );
            return Ok(EmergencyMatchResult {
                request_id,
                matched_donors: Vec::new(),
                total_matches: 0,
                urgency_level: request.urgency_level.clone(),
                message: Some(NO_DONORS_MESSAGE.to_string()),
            });
        }
    };

    debug!(
        "Request {}: scoring {} candidates for {}",
        request_id,
        candidates.len(),
        requested
    );
    let matched_donors = rank_donors(candidates, requested, request, now);
    info!(
        "Request {}: matched {} donors for {} x{} ({})",
        request_id,
        matched_donors.len(),
        requested,
        request.units_needed,
        request.urgency_level
    );

    Ok(EmergencyMatchResult {
        request_id,
        total_matches: matched_donors.len(),
        matched_donors,
        urgency_level: request.urgency_level.clone(),
        message: None,
    })
}

/// Filter donors by type and availability, then optionally by distance from
/// `search.center`.
pub async fn search_donors<R: FullRepository + ?Sized>(
    repo: &R,
    search: &DonorSearch,
) -> RepositoryResult<Vec<DonorSearchHit>> {
    let donors = repo
        .search_donors(&DonorFilter {
            blood_type: search.blood_type,
            is_available: search.is_available,
        })
        .await?;

    let hits = match search.center {
        None => donors
            .into_iter()
            .map(|donor| DonorSearchHit {
                donor,
                distance_km: None,
            })
            .collect(),
        Some(center) => donors
            .into_iter()
            .filter_map(|donor| {
                let distance = center.distance_km(&donor.location);
                (distance <= search.radius_km).then(|| DonorSearchHit {
                    donor,
                    distance_km: Some(round_to(distance, 2)),
                })
            })
            .collect(),
    };
    Ok(hits)
}
