//! Postgres repository implementation using Diesel.
//!
//! Implements the inventory, donor and history repository traits against the
//! blood-bank schema shipped in `migrations/`.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry with exponential backoff for transient failures
//! - Embedded migrations applied on startup
//! - Aggregations pushed down to SQL
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Date, Nullable, Text};
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::models::*;
use crate::db::repository::{
    DonorRepository, ErrorContext, HistoryRepository, InventoryRepository, RepositoryError,
    RepositoryResult,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const USAGE_SUMMARY_SQL: &str = "\
SELECT hospital_id, blood_type,
       AVG(units_used)::float8 AS avg_units_used,
       COUNT(*) AS days_of_data,
       MAX(units_used) AS peak_units_used
FROM blood_usage_history
WHERE date_of_usage >= $1
  AND ($2::text IS NULL OR hospital_id = $2)
  AND ($3::text IS NULL OR blood_type = $3)
GROUP BY hospital_id, blood_type
ORDER BY hospital_id, blood_type";

const MOVEMENT_TOTALS_SQL: &str = "\
SELECT hospital_id, blood_type,
       COALESCE(SUM(units_collected), 0)::int8 AS total_collected,
       COALESCE(SUM(units_used), 0)::int8 AS total_used,
       COALESCE(SUM(units_expired), 0)::int8 AS total_expired
FROM inventory_movements
WHERE ($1::text IS NULL OR hospital_id = $1)
  AND ($2::text IS NULL OR blood_type = $2)
  AND ($3::date IS NULL OR movement_date >= $3)
  AND ($4::date IS NULL OR movement_date <= $4)
GROUP BY hospital_id, blood_type
ORDER BY hospital_id, blood_type";

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of idle connections kept open
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Unparseable numeric values fall back to the defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub max_size: u32,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

#[derive(Debug, Default)]
struct QueryCounters {
    total: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    counters: Arc<QueryCounters>,
}

impl PostgresRepository {
    /// Build the pool and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection(e.to_string()).with_context(
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        let mut conn = pool
            .get()
            .map_err(|e| RepositoryError::from(e).with_operation("run_migrations"))?;
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal(format!("Migration failed: {}", e))
                .with_operation("run_migrations")
        })?;
        drop(conn);

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            counters: Arc::new(QueryCounters::default()),
        })
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`, retrying
    /// retryable failures with exponential backoff.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let counters = self.counters.clone();
        let max_retries = self.config.max_retries;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        task::spawn_blocking(move || {
            let mut attempt = 0;
            loop {
                let result = pool
                    .get()
                    .map_err(|e| {
                        RepositoryError::from(e).with_context(
                            ErrorContext::new(operation)
                                .with_details(format!("attempt={}", attempt + 1)),
                        )
                    })
                    .and_then(|mut conn| {
                        counters.total.fetch_add(1, Ordering::Relaxed);
                        f(&mut conn)
                    });

                match result {
                    Ok(value) => return Ok(value),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("{} failed (attempt {}): {}; retrying", operation, attempt + 1, e);
                        counters.retried.fetch_add(1, Ordering::Relaxed);
                        std::thread::sleep(delay);
                        delay *= 2;
                        attempt += 1;
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        return Err(e.with_operation(operation));
                    }
                }
            }
        })
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Task join error: {}", e)).with_operation(operation)
        })?
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            max_size: self.config.max_pool_size,
            total_queries: self.counters.total.load(Ordering::Relaxed),
            failed_queries: self.counters.failed.load(Ordering::Relaxed),
            retried_operations: self.counters.retried.load(Ordering::Relaxed),
        }
    }
}

fn collect_rows<R, T>(rows: Vec<R>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl InventoryRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn list_inventory(&self, filter: &StockFilter) -> RepositoryResult<Vec<InventoryRecord>> {
        let filter = filter.clone();
        let rows = self
            .with_conn("list_inventory", move |conn| {
                let mut query = blood_inventory::table.into_boxed();
                if let Some(hospital_id) = &filter.hospital_id {
                    query = query.filter(blood_inventory::hospital_id.eq(hospital_id.clone()));
                }
                if let Some(blood_type) = filter.blood_type {
                    query = query.filter(blood_inventory::blood_type.eq(blood_type.as_str()));
                }
                query
                    .order((blood_inventory::hospital_id.asc(), blood_inventory::blood_type.asc()))
                    .select(InventoryRow::as_select())
                    .load::<InventoryRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        collect_rows(rows)
    }

    async fn upsert_inventory(
        &self,
        hospital_id: &str,
        blood_type: BloodType,
        current_units: u32,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<InventoryRecord> {
        let units = i32::try_from(current_units).map_err(|_| {
            RepositoryError::validation(format!("current_units out of range: {}", current_units))
                .with_context(
                    ErrorContext::new("upsert_inventory")
                        .on("inventory", format!("{}/{}", hospital_id, blood_type)),
                )
        })?;
        let new_row = NewInventoryRow {
            hospital_id: hospital_id.to_string(),
            blood_type: blood_type.as_str().to_string(),
            current_units: units,
            last_updated: updated_at,
        };

        let row = self
            .with_conn("upsert_inventory", move |conn| {
                diesel::insert_into(blood_inventory::table)
                    .values(&new_row)
                    .on_conflict((blood_inventory::hospital_id, blood_inventory::blood_type))
                    .do_update()
                    .set((
                        blood_inventory::current_units
                            .eq(excluded(blood_inventory::current_units)),
                        blood_inventory::last_updated.eq(excluded(blood_inventory::last_updated)),
                    ))
                    .returning(InventoryRow::as_returning())
                    .get_result::<InventoryRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        InventoryRecord::try_from(row)
    }
}

#[async_trait]
impl DonorRepository for PostgresRepository {
    async fn find_available_donors(
        &self,
        blood_types: &[BloodType],
    ) -> RepositoryResult<Vec<Donor>> {
        let codes: Vec<String> = blood_types.iter().map(|b| b.as_str().to_string()).collect();
        let rows = self
            .with_conn("find_available_donors", move |conn| {
                donors::table
                    .filter(donors::is_available.eq(true))
                    .filter(donors::blood_type.eq_any(codes.clone()))
                    .order(donors::donor_id.asc())
                    .select(DonorRow::as_select())
                    .load::<DonorRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        collect_rows(rows)
    }

    async fn search_donors(&self, filter: &DonorFilter) -> RepositoryResult<Vec<Donor>> {
        let filter = filter.clone();
        let rows = self
            .with_conn("search_donors", move |conn| {
                let mut query = donors::table.into_boxed();
                if let Some(blood_type) = filter.blood_type {
                    query = query.filter(donors::blood_type.eq(blood_type.as_str()));
                }
                if let Some(is_available) = filter.is_available {
                    query = query.filter(donors::is_available.eq(is_available));
                }
                query
                    .order(donors::donor_id.asc())
                    .select(DonorRow::as_select())
                    .load::<DonorRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        collect_rows(rows)
    }

    async fn count_available_donors(&self) -> RepositoryResult<usize> {
        let count = self
            .with_conn("count_available_donors", |conn| {
                donors::table
                    .filter(donors::is_available.eq(true))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        usize::try_from(count).map_err(|_| RepositoryError::internal("negative donor count"))
    }
}

#[async_trait]
impl HistoryRepository for PostgresRepository {
    async fn usage_summaries(
        &self,
        filter: &StockFilter,
        since: NaiveDate,
    ) -> RepositoryResult<Vec<UsageSummary>> {
        let hospital_id = filter.hospital_id.clone();
        let blood_type = filter.blood_type.map(|b| b.as_str().to_string());
        let rows = self
            .with_conn("usage_summaries", move |conn| {
                sql_query(USAGE_SUMMARY_SQL)
                    .bind::<Date, _>(since)
                    .bind::<Nullable<Text>, _>(hospital_id.clone())
                    .bind::<Nullable<Text>, _>(blood_type.clone())
                    .load::<UsageSummaryRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        collect_rows(rows)
    }

    async fn movement_totals(
        &self,
        filter: &MovementFilter,
    ) -> RepositoryResult<Vec<MovementTotals>> {
        let filter = filter.clone();
        let rows = self
            .with_conn("movement_totals", move |conn| {
                sql_query(MOVEMENT_TOTALS_SQL)
                    .bind::<Nullable<Text>, _>(filter.stock.hospital_id.clone())
                    .bind::<Nullable<Text>, _>(
                        filter.stock.blood_type.map(|b| b.as_str().to_string()),
                    )
                    .bind::<Nullable<Date>, _>(filter.start_date)
                    .bind::<Nullable<Date>, _>(filter.end_date)
                    .load::<MovementTotalsRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        collect_rows(rows)
    }

    async fn events_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DemandEvent>> {
        let rows = self
            .with_conn("events_between", move |conn| {
                events::table
                    .filter(events::event_date.between(from, to))
                    .order(events::event_date.asc())
                    .select(EventRow::as_select())
                    .load::<EventRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows.into_iter().map(DemandEvent::from).collect())
    }

    async fn hospital_locations(&self) -> RepositoryResult<Vec<HospitalLocation>> {
        let rows = self
            .with_conn("hospital_locations", |conn| {
                hospitals::table
                    .order(hospitals::hospital_id.asc())
                    .select(HospitalRow::as_select())
                    .load::<HospitalRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows.into_iter().map(HospitalLocation::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/bloodbank");
        assert_eq!(config.database_url, "postgres://localhost/bloodbank");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 100);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("BLOODBANK_TEST_PG_GARBAGE", "not-a-number");
        assert_eq!(env_or::<u32>("BLOODBANK_TEST_PG_GARBAGE", 7), 7);
        std::env::remove_var("BLOODBANK_TEST_PG_GARBAGE");
        assert_eq!(env_or::<u32>("BLOODBANK_TEST_PG_GARBAGE", 9), 9);
    }
}
