//! Geographic risk heatmap over inventory lines.

use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;

use crate::algorithms::analytics::{area_risk, demand_score};
use crate::algorithms::round_to;
use crate::api::{BoundingBox, Heatmap, HeatmapArea, HeatmapMetadata};
use crate::db::models::{BloodType, StockFilter};
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::GeoPoint;

/// Where hospitals without registered coordinates are placed.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    latitude: 30.0444,
    longitude: 31.2357,
};

/// One area per inventory line, optionally restricted to a blood type and
/// to areas inside `bounds`.
///
/// Donor density is the system-wide count of available donors for every
/// area; it is not yet localized.
pub async fn build_heatmap<R: FullRepository + ?Sized>(
    repo: &R,
    blood_type: Option<BloodType>,
    bounds: Option<BoundingBox>,
    now: DateTime<Utc>,
) -> RepositoryResult<Heatmap> {
    let inventory = repo
        .list_inventory(&StockFilter::new(None, blood_type))
        .await?;
    let sites: HashMap<String, GeoPoint> = repo
        .hospital_locations()
        .await?
        .into_iter()
        .map(|h| (h.hospital_id, h.location))
        .collect();
    let donor_density = repo.count_available_donors().await?;

    let areas: Vec<HeatmapArea> = inventory
        .into_iter()
        .filter_map(|line| {
            let location = sites
                .get(&line.hospital_id)
                .copied()
                .unwrap_or(DEFAULT_CENTER);
            if bounds.is_some_and(|b| !b.contains(&location)) {
                return None;
            }

            let demand = demand_score(line.current_units);
            Some(HeatmapArea {
                area_id: format!("AREA_{}_{}", line.hospital_id, line.blood_type),
                hospital_id: line.hospital_id,
                blood_type: line.blood_type,
                location,
                demand_score: round_to(demand, 2),
                donor_density,
                risk_level: area_risk(demand, donor_density),
            })
        })
        .collect();

    let high_risk_areas = areas.iter().filter(|a| a.risk_level.is_high_risk()).count();
    debug!(
        "Heatmap: {} areas ({} high risk), {} available donors",
        areas.len(),
        high_risk_areas,
        donor_density
    );

    Ok(Heatmap {
        metadata: HeatmapMetadata {
            total_areas: areas.len(),
            high_risk_areas,
            generated_at: now,
        },
        areas,
    })
}
