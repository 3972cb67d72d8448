use chrono::{DateTime, TimeZone, Utc};

use crate::api::{DonorSearch, EmergencyRequest};
use crate::db::models::{BloodType, Donor, GeoPoint};
use crate::db::repositories::LocalRepository;
use crate::services::matching::{
    match_donors, match_limit, search_donors, RequestIdStrategy, NO_DONORS_MESSAGE,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

fn hospital() -> GeoPoint {
    GeoPoint::new(30.0444, 31.2357)
}

fn donor(id: &str, bt: BloodType, at: (f64, f64), last: Option<&str>, available: bool) -> Donor {
    Donor {
        donor_id: id.to_string(),
        blood_type: bt,
        location: GeoPoint::new(at.0, at.1),
        last_donation_date: last.map(str::to_string),
        is_available: available,
    }
}

fn request(blood_type: &str, units: u32, urgency: &str) -> EmergencyRequest {
    EmergencyRequest {
        hospital_id: "H001".into(),
        blood_type_needed: blood_type.into(),
        units_needed: units,
        location: hospital(),
        urgency_level: urgency.into(),
    }
}

fn seeded() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.add_donor(donor("D001", BloodType::OPositive, (30.05, 31.24), Some("2023-12-10"), true));
    repo.add_donor(donor("D002", BloodType::ONegative, (30.05, 31.24), Some("2024-05-20"), true));
    repo.add_donor(donor("D003", BloodType::APositive, (30.05, 31.24), None, true));
    repo.add_donor(donor("D004", BloodType::OPositive, (30.05, 31.24), None, false));
    repo.add_donor(donor("D005", BloodType::OPositive, (31.2, 29.9), None, true));
    repo
}

#[test]
fn test_match_limit() {
    assert_eq!(match_limit(1), 2);
    assert_eq!(match_limit(5), 10);
    assert_eq!(match_limit(50), 10);
    assert_eq!(match_limit(0), 0);
}

#[test]
fn test_timestamp_request_id() {
    assert_eq!(RequestIdStrategy::Timestamp.generate(now()), "REQ20240601100000");
    // Same second, same id.
    assert_eq!(
        RequestIdStrategy::Timestamp.generate(now()),
        RequestIdStrategy::default().generate(now())
    );
}

#[test]
fn test_uuid_request_id() {
    let a = RequestIdStrategy::Uuid.generate(now());
    let b = RequestIdStrategy::Uuid.generate(now());
    assert!(a.starts_with("REQ-"));
    assert_eq!(a.len(), 4 + 36);
    assert_ne!(a, b);
    assert_eq!("UUID".parse::<RequestIdStrategy>().unwrap(), RequestIdStrategy::Uuid);
    assert!("random".parse::<RequestIdStrategy>().is_err());
}

#[tokio::test]
async fn test_ranks_compatible_available_donors() {
    let repo = seeded();
    let result = match_donors(&repo, &request("O+", 2, "MEDIUM"), RequestIdStrategy::Timestamp, now())
        .await
        .unwrap();

    let ids: Vec<&str> = result.matched_donors.iter().map(|d| d.donor_id.as_str()).collect();
    assert_eq!(ids, vec!["D001", "D002", "D005"]);
    assert_eq!(result.total_matches, 3);
    assert_eq!(result.request_id, "REQ20240601100000");
    assert_eq!(result.urgency_level, "MEDIUM");
    assert!(result.message.is_none());

    let best = &result.matched_donors[0];
    assert_eq!(best.matching_score, 1.0);
    assert!(best.distance_km < 1.0);
    assert_eq!(best.last_donation_date.as_deref(), Some("2023-12-10"));

    // (0.7*0.4 + 1.0*0.3 + 0.3*0.2 + 0.1) = 0.74
    assert_eq!(result.matched_donors[1].matching_score, 0.74);
    assert!(result.matched_donors.iter().all(|d| d.is_available));
}

#[tokio::test]
async fn test_truncates_to_twice_units_needed() {
    let repo = seeded();
    let result = match_donors(&repo, &request("O+", 1, "HIGH"), RequestIdStrategy::Timestamp, now())
        .await
        .unwrap();
    assert_eq!(result.total_matches, 2);
    assert_eq!(result.matched_donors[0].donor_id, "D001");
}

#[tokio::test]
async fn test_equal_scores_keep_store_order() {
    let repo = LocalRepository::new();
    for id in ["D020", "D010", "D030"] {
        repo.add_donor(donor(id, BloodType::BPositive, (30.05, 31.24), None, true));
    }
    let result = match_donors(&repo, &request("B+", 5, "LOW"), RequestIdStrategy::Timestamp, now())
        .await
        .unwrap();
    let ids: Vec<&str> = result.matched_donors.iter().map(|d| d.donor_id.as_str()).collect();
    assert_eq!(ids, vec!["D010", "D020", "D030"]);
}

#[tokio::test]
async fn test_no_compatible_donors_is_not_an_error() {
    // O- patients can only receive O-.
    let repo = LocalRepository::new();
    repo.add_donor(donor("D003", BloodType::APositive, (30.05, 31.24), None, true));
    repo.add_donor(donor("D004", BloodType::ONegative, (30.05, 31.24), None, false));

    let result = match_donors(
        &repo,
        &request("O-", 3, "CRITICAL"),
        RequestIdStrategy::Timestamp,
        now(),
    )
    .await
    .unwrap();
    assert!(result.matched_donors.is_empty());
    assert_eq!(result.total_matches, 0);
    assert_eq!(result.message.as_deref(), Some(NO_DONORS_MESSAGE));
}

#[tokio::test]
async fn test_unknown_blood_type_finds_nobody() {
    let repo = seeded();
    let result = match_donors(&repo, &request("X+", 3, "HIGH"), RequestIdStrategy::Timestamp, now())
        .await
        .unwrap();
    assert!(result.matched_donors.is_empty());
    assert_eq!(result.message.as_deref(), Some(NO_DONORS_MESSAGE));
}

#[tokio::test]
async fn test_unknown_urgency_scores_like_medium() {
    let repo = seeded();
    let medium = match_donors(&repo, &request("O+", 5, "MEDIUM"), RequestIdStrategy::Timestamp, now())
        .await
        .unwrap();
    let unknown = match_donors(&repo, &request("O+", 5, "whenever"), RequestIdStrategy::Timestamp, now())
        .await
        .unwrap();
    assert_eq!(medium.matched_donors, unknown.matched_donors);
    assert_eq!(unknown.urgency_level, "whenever");
}

#[tokio::test]
async fn test_search_without_center_lists_all_matching() {
    let repo = seeded();
    let hits = search_donors(
        &repo,
        &DonorSearch {
            blood_type: Some(BloodType::OPositive),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.distance_km.is_none()));
}

#[tokio::test]
async fn test_search_with_center_applies_radius() {
    let repo = seeded();
    let hits = search_donors(
        &repo,
        &DonorSearch {
            blood_type: Some(BloodType::OPositive),
            center: Some(hospital()),
            radius_km: 10.0,
            is_available: Some(true),
        },
    )
    .await
    .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].donor.donor_id, "D001");
    assert!(hits[0].distance_km.unwrap() <= 10.0);
}
