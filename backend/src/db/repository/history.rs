//! Historical records: usage, movements, events and hospital sites.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::db::models::{
    DemandEvent, HospitalLocation, MovementFilter, MovementTotals, StockFilter, UsageSummary,
};

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Aggregate usage records dated on or after `since`, grouped by
    /// (hospital, blood type).
    ///
    /// Groups with no records in the window are absent.
    async fn usage_summaries(
        &self,
        filter: &StockFilter,
        since: NaiveDate,
    ) -> RepositoryResult<Vec<UsageSummary>>;

    /// Sum collected/used/expired units grouped by (hospital, blood type).
    async fn movement_totals(&self, filter: &MovementFilter)
        -> RepositoryResult<Vec<MovementTotals>>;

    /// Events dated within `[from, to]`, inclusive.
    async fn events_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DemandEvent>>;

    /// All registered hospital coordinates.
    async fn hospital_locations(&self) -> RepositoryResult<Vec<HospitalLocation>>;
}
