//! Inventory repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::db::models::{BloodType, InventoryRecord, StockFilter};

/// Current stock per (hospital, blood type).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// List inventory rows matching `filter`, ordered by hospital id, then
    /// by blood type code compared as text (`A+`, `A-`, `AB+`, ..., `O-`).
    async fn list_inventory(&self, filter: &StockFilter) -> RepositoryResult<Vec<InventoryRecord>>;

    /// Insert or update the row for `(hospital_id, blood_type)`.
    ///
    /// Must be atomic at the row level: two concurrent upserts of the same
    /// key leave exactly one of the written values, never a lost row.
    ///
    /// # Returns
    /// The row as stored.
    async fn upsert_inventory(
        &self,
        hospital_id: &str,
        blood_type: BloodType,
        current_units: u32,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<InventoryRecord>;
}
