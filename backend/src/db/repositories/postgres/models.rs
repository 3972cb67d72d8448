use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Text};

use super::schema::{blood_inventory, donors, events, hospitals};
use crate::db::models::{
    BloodType, DemandEvent, Donor, GeoPoint, HospitalLocation, InventoryRecord, MovementTotals,
    UsageSummary,
};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

fn parse_blood_type(raw: &str, record: &str) -> RepositoryResult<BloodType> {
    raw.parse::<BloodType>().map_err(|e| {
        RepositoryError::validation(e)
            .with_context(ErrorContext::new("decode_row").on_kind(record))
    })
}

fn non_negative<T: TryFrom<i64>>(value: i64, field: &str) -> RepositoryResult<T> {
    T::try_from(value).map_err(|_| {
        RepositoryError::validation(format!("{} out of range: {}", field, value))
            .with_context(ErrorContext::new("decode_row"))
    })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = blood_inventory)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InventoryRow {
    pub hospital_id: String,
    pub blood_type: String,
    pub current_units: i32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blood_inventory)]
pub struct NewInventoryRow {
    pub hospital_id: String,
    pub blood_type: String,
    pub current_units: i32,
    pub last_updated: DateTime<Utc>,
}

impl TryFrom<InventoryRow> for InventoryRecord {
    type Error = RepositoryError;

    fn try_from(row: InventoryRow) -> RepositoryResult<Self> {
        Ok(InventoryRecord {
            blood_type: parse_blood_type(&row.blood_type, "inventory")?,
            current_units: non_negative(i64::from(row.current_units), "current_units")?,
            hospital_id: row.hospital_id,
            last_updated: row.last_updated,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DonorRow {
    pub donor_id: String,
    pub blood_type: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub last_donation_date: Option<String>,
    pub is_available: bool,
}

impl TryFrom<DonorRow> for Donor {
    type Error = RepositoryError;

    fn try_from(row: DonorRow) -> RepositoryResult<Self> {
        Ok(Donor {
            blood_type: parse_blood_type(&row.blood_type, "donor")?,
            donor_id: row.donor_id,
            location: GeoPoint::new(row.location_lat, row.location_lng),
            last_donation_date: row.last_donation_date,
            is_available: row.is_available,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // event_id only identifies the row
pub struct EventRow {
    pub event_id: i64,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub impact_level: f64,
    pub description: Option<String>,
}

impl From<EventRow> for DemandEvent {
    fn from(row: EventRow) -> Self {
        DemandEvent {
            event_name: row.event_name,
            event_date: row.event_date,
            impact_level: row.impact_level,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = hospitals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HospitalRow {
    pub hospital_id: String,
    pub hospital_name: String,
    pub location_lat: f64,
    pub location_lng: f64,
}

impl From<HospitalRow> for HospitalLocation {
    fn from(row: HospitalRow) -> Self {
        HospitalLocation {
            hospital_id: row.hospital_id,
            hospital_name: row.hospital_name,
            location: GeoPoint::new(row.location_lat, row.location_lng),
        }
    }
}

/// Result of the grouped usage aggregate query.
#[derive(Debug, Clone, QueryableByName)]
pub struct UsageSummaryRow {
    #[diesel(sql_type = Text)]
    pub hospital_id: String,
    #[diesel(sql_type = Text)]
    pub blood_type: String,
    #[diesel(sql_type = Double)]
    pub avg_units_used: f64,
    #[diesel(sql_type = BigInt)]
    pub days_of_data: i64,
    #[diesel(sql_type = Integer)]
    pub peak_units_used: i32,
}

impl TryFrom<UsageSummaryRow> for UsageSummary {
    type Error = RepositoryError;

    fn try_from(row: UsageSummaryRow) -> RepositoryResult<Self> {
        Ok(UsageSummary {
            blood_type: parse_blood_type(&row.blood_type, "usage")?,
            hospital_id: row.hospital_id,
            avg_units_used: row.avg_units_used,
            days_of_data: non_negative(row.days_of_data, "days_of_data")?,
            peak_units_used: non_negative(i64::from(row.peak_units_used), "peak_units_used")?,
        })
    }
}

/// Result of the grouped movement totals query.
#[derive(Debug, Clone, QueryableByName)]
pub struct MovementTotalsRow {
    #[diesel(sql_type = Text)]
    pub hospital_id: String,
    #[diesel(sql_type = Text)]
    pub blood_type: String,
    #[diesel(sql_type = BigInt)]
    pub total_collected: i64,
    #[diesel(sql_type = BigInt)]
    pub total_used: i64,
    #[diesel(sql_type = BigInt)]
    pub total_expired: i64,
}

impl TryFrom<MovementTotalsRow> for MovementTotals {
    type Error = RepositoryError;

    fn try_from(row: MovementTotalsRow) -> RepositoryResult<Self> {
        Ok(MovementTotals {
            blood_type: parse_blood_type(&row.blood_type, "movement")?,
            hospital_id: row.hospital_id,
            total_collected: non_negative(row.total_collected, "total_collected")?,
            total_used: non_negative(row.total_used, "total_used")?,
            total_expired: non_negative(row.total_expired, "total_expired")?,
        })
    }
}
