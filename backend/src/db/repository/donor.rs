//! Donor repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::{BloodType, Donor, DonorFilter};

#[async_trait]
pub trait DonorRepository: Send + Sync {
    /// Donors flagged available whose type is one of `blood_types`.
    ///
    /// Rows come back in a stable store order (by donor id) so that ties in
    /// the match score keep a deterministic ranking.
    async fn find_available_donors(&self, blood_types: &[BloodType])
        -> RepositoryResult<Vec<Donor>>;

    /// Donors matching an exact blood type and/or availability flag.
    async fn search_donors(&self, filter: &DonorFilter) -> RepositoryResult<Vec<Donor>>;

    /// Number of donors currently flagged available, system-wide.
    async fn count_available_donors(&self) -> RepositoryResult<usize>;
}
