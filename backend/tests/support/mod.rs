#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use bloodbank::db::models::{
    BloodType, DemandEvent, Donor, GeoPoint, HospitalLocation, MovementRecord, UsageRecord,
};
use bloodbank::db::repositories::LocalRepository;
use bloodbank::db::repository::InventoryRepository;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Seed data
// =============================================================================

pub const CAIRO: GeoPoint = GeoPoint {
    latitude: 30.0444,
    longitude: 31.2357,
};

pub fn donor(id: &str, blood_type: BloodType, lat: f64, lng: f64, available: bool) -> Donor {
    Donor {
        donor_id: id.to_string(),
        blood_type,
        location: GeoPoint::new(lat, lng),
        last_donation_date: Some("2023-01-01".to_string()),
        is_available: available,
    }
}

fn usage(hospital: &str, blood_type: BloodType, date: NaiveDate, units: u32) -> UsageRecord {
    UsageRecord {
        hospital_id: hospital.to_string(),
        blood_type,
        date_of_usage: date,
        units_used: units,
    }
}

fn movement(
    hospital: &str,
    blood_type: BloodType,
    date: NaiveDate,
    collected: u32,
    expired: u32,
) -> MovementRecord {
    MovementRecord {
        hospital_id: hospital.to_string(),
        blood_type,
        movement_date: date,
        units_collected: collected,
        units_used: collected - expired,
        units_expired: expired,
    }
}

/// A small network of two hospitals relative to `now`:
///
/// - H001 O+ : 15 units, 3/day over the last 10 days, 250 collected / 15 expired
/// - H001 A+ : 8 units, 4/day over the last 10 days
/// - H002 B+ : 400 units, no usage, 100 collected / 30 expired
/// - donors D001 O+, D002 O- (available), D003 O+ (unavailable), D004 A+ (available)
/// - a 1.5x event in 10 days, H001 registered in Cairo
pub async fn seeded_repository(now: DateTime<Utc>) -> LocalRepository {
    let today = now.date_naive();
    let repo = LocalRepository::new();

    repo.upsert_inventory("H001", BloodType::OPositive, 15, now)
        .await
        .unwrap();
    repo.upsert_inventory("H001", BloodType::APositive, 8, now)
        .await
        .unwrap();
    repo.upsert_inventory("H002", BloodType::BPositive, 400, now)
        .await
        .unwrap();

    for d in 1..=10 {
        let date = today - Duration::days(d);
        repo.add_usage(usage("H001", BloodType::OPositive, date, 3));
        repo.add_usage(usage("H001", BloodType::APositive, date, 4));
    }

    repo.add_movement(movement("H001", BloodType::OPositive, today - Duration::days(5), 100, 5));
    repo.add_movement(movement("H001", BloodType::OPositive, today - Duration::days(3), 150, 10));
    repo.add_movement(movement("H002", BloodType::BPositive, today - Duration::days(4), 100, 30));

    repo.add_donor(donor("D001", BloodType::OPositive, 30.0500, 31.2400, true));
    repo.add_donor(donor("D002", BloodType::ONegative, 30.0600, 31.2500, true));
    repo.add_donor(donor("D003", BloodType::OPositive, 30.0450, 31.2360, false));
    repo.add_donor(donor("D004", BloodType::APositive, 30.0460, 31.2370, true));

    repo.add_event(DemandEvent {
        event_name: "National Holiday".to_string(),
        event_date: today + Duration::days(10),
        impact_level: 1.5,
        description: None,
    });

    repo.add_hospital(HospitalLocation {
        hospital_id: "H001".to_string(),
        hospital_name: "Cairo General".to_string(),
        location: CAIRO,
    });

    repo
}
