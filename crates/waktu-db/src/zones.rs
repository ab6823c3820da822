//! Database operations for the `zones` catalog table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use waktu_core::ZoneEntry;

use crate::DbError;

/// A row from the `zones` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ZoneRow {
    pub id: i64,
    pub zone_code: String,
    pub state: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<ZoneRow> for ZoneEntry {
    fn from(row: ZoneRow) -> Self {
        Self {
            code: row.zone_code,
            state: row.state,
            description: row.description,
        }
    }
}

/// Replaces the whole catalog with `entries`.
///
/// Delete and insert run in one transaction; readers see either the old or
/// the new catalog. Duplicate codes in `entries` keep the last occurrence.
///
/// Returns the number of rows in the new catalog.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the transaction is
/// rolled back.
pub async fn replace_zones(pool: &PgPool, entries: &[ZoneEntry]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM zones").execute(&mut *tx).await?;

    for entry in entries {
        sqlx::query(
            "INSERT INTO zones (zone_code, state, description) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (zone_code) DO UPDATE SET \
                 state       = EXCLUDED.state, \
                 description = EXCLUDED.description",
        )
        .bind(entry.code.trim().to_uppercase())
        .bind(entry.state.trim())
        .bind(entry.description.trim())
        .execute(&mut *tx)
        .await?;
    }

    let count: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM zones")
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(usize::try_from(count).unwrap_or(0))
}

/// Returns the catalog ordered by state, then zone code.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_zones(pool: &PgPool) -> Result<Vec<ZoneRow>, DbError> {
    let rows = sqlx::query_as::<_, ZoneRow>(
        "SELECT id, zone_code, state, description, created_at \
         FROM zones \
         ORDER BY state, zone_code",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
