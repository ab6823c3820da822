//! Postgres persistence for prayer times and the zone catalog.

use std::collections::HashSet;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use waktu_core::AppConfig;

pub mod prayer_times;
pub mod zones;

pub use prayer_times::{
    find_history, find_today, upsert_prayer_time, PrayerTimeRow, UpsertOutcome,
};
pub use zones::{list_zones, replace_zones, ZoneRow};

// Resolved from crates/waktu-db/ to the workspace migrations directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pool sizing taken from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections.min(config.db_max_connections),
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
        }
    }

    fn options(self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Opens a pool against `config.database_url` sized by the `db_*` settings.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if no connection can be established.
pub async fn connect(config: &AppConfig) -> Result<PgPool, DbError> {
    let pool = PoolConfig::from_app_config(config)
        .options()
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Applies pending migrations and returns how many ran.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    // The bookkeeping table is missing on a fresh database.
    let applied: HashSet<i64> = sqlx::query_scalar::<_, i64>(
        "SELECT version FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_all(pool)
    .await
    .map(|versions| versions.into_iter().collect())
    .unwrap_or_default();

    let pending = pending_migrations(MIGRATOR.iter().map(|m| m.version), &applied);
    MIGRATOR.run(pool).await?;
    Ok(pending)
}

fn pending_migrations(known: impl Iterator<Item = i64>, applied: &HashSet<i64>) -> usize {
    known.filter(|version| !applied.contains(version)).count()
}

/// Round-trips `SELECT 1` on the pool.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}
