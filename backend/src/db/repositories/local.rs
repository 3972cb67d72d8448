//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data lives in memory
//! behind a single lock, giving fast, deterministic and isolated execution.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::db::models::*;
use crate::db::repository::*;

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same data, so a test can keep a
/// handle for seeding while the server holds another.
///
/// # Example
/// ```
/// use bloodbank::db::repositories::LocalRepository;
/// use bloodbank::models::{BloodType, Donor, GeoPoint};
///
/// let repo = LocalRepository::new();
/// repo.add_donor(Donor {
///     donor_id: "D001".to_string(),
///     blood_type: BloodType::OPositive,
///     location: GeoPoint::new(30.05, 31.24),
///     last_donation_date: Some("2023-12-10".to_string()),
///     is_available: true,
/// });
/// assert_eq!(repo.donor_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

/// Hospital id, then blood type code. Ordering by the code text (`A+`
/// before `A-` before `AB+`) keeps row order identical to the Postgres store.
type StockKey = (String, &'static str);

fn stock_key(hospital_id: &str, blood_type: BloodType) -> StockKey {
    (hospital_id.to_string(), blood_type.as_str())
}

struct LocalData {
    inventory: BTreeMap<StockKey, InventoryRecord>,
    usage: Vec<UsageRecord>,
    donors: BTreeMap<String, Donor>,
    movements: Vec<MovementRecord>,
    events: Vec<DemandEvent>,
    hospitals: HashMap<String, HospitalLocation>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            inventory: BTreeMap::new(),
            usage: Vec::new(),
            donors: BTreeMap::new(),
            movements: Vec::new(),
            events: Vec::new(),
            hospitals: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Add or replace a donor (keyed by `donor_id`).
    pub fn add_donor(&self, donor: Donor) {
        self.data
            .write()
            .donors
            .insert(donor.donor_id.clone(), donor);
    }

    /// Append a usage record.
    pub fn add_usage(&self, record: UsageRecord) {
        self.data.write().usage.push(record);
    }

    /// Append a movement record.
    pub fn add_movement(&self, record: MovementRecord) {
        self.data.write().movements.push(record);
    }

    /// Append a demand event.
    pub fn add_event(&self, event: DemandEvent) {
        self.data.write().events.push(event);
    }

    /// Register (or move) a hospital.
    pub fn add_hospital(&self, hospital: HospitalLocation) {
        self.data
            .write()
            .hospitals
            .insert(hospital.hospital_id.clone(), hospital);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn donor_count(&self) -> usize {
        self.data.read().donors.len()
    }

    pub fn inventory_count(&self) -> usize {
        self.data.read().inventory.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy")
                .with_context(ErrorContext::new(operation)));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_inventory(&self, filter: &StockFilter) -> RepositoryResult<Vec<InventoryRecord>> {
        self.check_health("list_inventory")?;
        let data = self.data.read();
        Ok(data
            .inventory
            .values()
            .filter(|r| filter.matches(&r.hospital_id, r.blood_type))
            .cloned()
            .collect())
    }

    async fn upsert_inventory(
        &self,
        hospital_id: &str,
        blood_type: BloodType,
        current_units: u32,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<InventoryRecord> {
        self.check_health("upsert_inventory")?;
        let record = InventoryRecord {
            hospital_id: hospital_id.to_string(),
            blood_type,
            current_units,
            last_updated: updated_at,
        };
        // Single write-locked insert: the whole upsert is one critical section.
        self.data
            .write()
            .inventory
            .insert(stock_key(hospital_id, blood_type), record.clone());
        Ok(record)
    }
}

#[async_trait]
impl DonorRepository for LocalRepository {
    async fn find_available_donors(
        &self,
        blood_types: &[BloodType],
    ) -> RepositoryResult<Vec<Donor>> {
        self.check_health("find_available_donors")?;
        let data = self.data.read();
        Ok(data
            .donors
            .values()
            .filter(|d| d.is_available && blood_types.contains(&d.blood_type))
            .cloned()
            .collect())
    }

    async fn search_donors(&self, filter: &DonorFilter) -> RepositoryResult<Vec<Donor>> {
        self.check_health("search_donors")?;
        let data = self.data.read();
        Ok(data
            .donors
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    async fn count_available_donors(&self) -> RepositoryResult<usize> {
        self.check_health("count_available_donors")?;
        Ok(self.data.read().donors.values().filter(|d| d.is_available).count())
    }
}

#[async_trait]
impl HistoryRepository for LocalRepository {
    async fn usage_summaries(
        &self,
        filter: &StockFilter,
        since: NaiveDate,
    ) -> RepositoryResult<Vec<UsageSummary>> {
        self.check_health("usage_summaries")?;
        let data = self.data.read();

        // (type, sum, count, peak) per group
        let mut groups: BTreeMap<StockKey, (BloodType, u64, u64, u32)> = BTreeMap::new();
        for record in data
            .usage
            .iter()
            .filter(|r| r.date_of_usage >= since)
            .filter(|r| filter.matches(&r.hospital_id, r.blood_type))
        {
            let entry = groups
                .entry(stock_key(&record.hospital_id, record.blood_type))
                .or_insert((record.blood_type, 0, 0, 0));
            entry.1 += u64::from(record.units_used);
            entry.2 += 1;
            entry.3 = entry.3.max(record.units_used);
        }

        Ok(groups
            .into_iter()
            .map(|((hospital_id, _), (blood_type, sum, count, peak))| UsageSummary {
                hospital_id,
                blood_type,
                avg_units_used: sum as f64 / count as f64,
                days_of_data: count,
                peak_units_used: peak,
            })
            .collect())
    }

    async fn movement_totals(
        &self,
        filter: &MovementFilter,
    ) -> RepositoryResult<Vec<MovementTotals>> {
        self.check_health("movement_totals")?;
        let data = self.data.read();

        let mut groups: BTreeMap<StockKey, MovementTotals> = BTreeMap::new();
        for record in data.movements.iter().filter(|r| filter.matches(r)) {
            let totals = groups
                .entry(stock_key(&record.hospital_id, record.blood_type))
                .or_insert_with(|| MovementTotals {
                    hospital_id: record.hospital_id.clone(),
                    blood_type: record.blood_type,
                    total_collected: 0,
                    total_used: 0,
                    total_expired: 0,
                });
            totals.total_collected += u64::from(record.units_collected);
            totals.total_used += u64::from(record.units_used);
            totals.total_expired += u64::from(record.units_expired);
        }

        Ok(groups.into_values().collect())
    }

    async fn events_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DemandEvent>> {
        self.check_health("events_between")?;
        let data = self.data.read();
        let mut events: Vec<DemandEvent> = data
            .events
            .iter()
            .filter(|e| e.event_date >= from && e.event_date <= to)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.event_date);
        Ok(events)
    }

    async fn hospital_locations(&self) -> RepositoryResult<Vec<HospitalLocation>> {
        self.check_health("hospital_locations")?;
        let data = self.data.read();
        let mut hospitals: Vec<HospitalLocation> = data.hospitals.values().cloned().collect();
        hospitals.sort_by(|a, b| a.hospital_id.cmp(&b.hospital_id));
        Ok(hospitals)
    }
}
