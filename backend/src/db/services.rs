//! Repository-agnostic store operations.
//!
//! Thin wrappers over the repository traits that add input validation and
//! logging, so every backend enforces the same rules.
//!
//! ```no_run
//! use bloodbank::db::{services, repositories::LocalRepository};
//! use bloodbank::models::BloodType;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     services::update_inventory(&repo, "H001", BloodType::OPositive, 45, chrono::Utc::now())
//!         .await?;
//!     let rows = services::list_inventory(&repo, &Default::default()).await?;
//!     println!("{} inventory rows", rows.len());
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::models::{BloodType, InventoryRecord, StockFilter};
use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};

/// Check if the store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Current stock, optionally restricted to one hospital and/or blood type.
pub async fn list_inventory<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &StockFilter,
) -> RepositoryResult<Vec<InventoryRecord>> {
    let rows = repo.list_inventory(filter).await?;
    debug!(
        "Service layer: listed {} inventory rows (hospital={:?}, blood_type={:?})",
        rows.len(),
        filter.hospital_id,
        filter.blood_type
    );
    Ok(rows)
}

/// Set the stock level of one (hospital, blood type) line, creating it if
/// needed. `last_updated` is set to `now`.
pub async fn update_inventory<R: FullRepository + ?Sized>(
    repo: &R,
    hospital_id: &str,
    blood_type: BloodType,
    current_units: u32,
    now: DateTime<Utc>,
) -> RepositoryResult<InventoryRecord> {
    let hospital_id = hospital_id.trim();
    if hospital_id.is_empty() {
        return Err(RepositoryError::validation("hospital_id must not be empty")
            .with_context(ErrorContext::new("update_inventory").on_kind("inventory")));
    }

    let record = repo
        .upsert_inventory(hospital_id, blood_type, current_units, now)
        .await?;
    info!(
        "Service layer: inventory {} {} set to {} units",
        record.hospital_id, record.blood_type, record.current_units
    );
    Ok(record)
}
