//! Database operations for the `prayer_times` table.
//!
//! Rows are keyed on `(zone_code, gregorian_date)`. `zone_code` is the bare
//! code derived from the zone label at write time, so lookups use plain
//! equality on an indexed column.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use waktu_core::PrayerTimeRecord;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `prayer_times` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrayerTimeRow {
    pub id: i64,
    pub zone_code: String,
    pub zone_label: String,
    pub bearing: String,
    pub gregorian_date: String,
    pub hijri_date: String,
    pub imsak: String,
    pub subuh: String,
    pub syuruk: String,
    pub dhuha: String,
    pub zohor: String,
    pub asar: String,
    pub maghrib: String,
    pub isyak: String,
    pub created_at: DateTime<Utc>,
}

impl From<PrayerTimeRow> for PrayerTimeRecord {
    fn from(row: PrayerTimeRow) -> Self {
        Self {
            zone_label: row.zone_label,
            bearing: row.bearing,
            gregorian_date: row.gregorian_date,
            hijri_date: row.hijri_date,
            imsak: row.imsak,
            subuh: row.subuh,
            syuruk: row.syuruk,
            dhuha: row.dhuha,
            zohor: row.zohor,
            asar: row.asar,
            maghrib: row.maghrib,
            isyak: row.isyak,
            created_at: row.created_at,
        }
    }
}

/// Whether an upsert created a new row or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts or updates the row for the record's `(zone_code, gregorian_date)`.
///
/// On conflict the bearing, Hijri date, all eight times and `created_at` are
/// rewritten; `zone_code`, `zone_label` and `gregorian_date` are left as
/// first written. A single statement, so concurrent writers for the same key
/// cannot produce two rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_prayer_time(
    pool: &PgPool,
    record: &PrayerTimeRecord,
) -> Result<UpsertOutcome, DbError> {
    let inserted: bool = sqlx::query_scalar::<_, bool>(
        "INSERT INTO prayer_times \
             (zone_code, zone_label, bearing, gregorian_date, hijri_date, \
              imsak, subuh, syuruk, dhuha, zohor, asar, maghrib, isyak) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (zone_code, gregorian_date) DO UPDATE SET \
             bearing    = EXCLUDED.bearing, \
             hijri_date = EXCLUDED.hijri_date, \
             imsak      = EXCLUDED.imsak, \
             subuh      = EXCLUDED.subuh, \
             syuruk     = EXCLUDED.syuruk, \
             dhuha      = EXCLUDED.dhuha, \
             zohor      = EXCLUDED.zohor, \
             asar       = EXCLUDED.asar, \
             maghrib    = EXCLUDED.maghrib, \
             isyak      = EXCLUDED.isyak, \
             created_at = NOW() \
         RETURNING (xmax = 0) AS inserted",
    )
    .bind(record.zone_code())
    .bind(&record.zone_label)
    .bind(&record.bearing)
    .bind(&record.gregorian_date)
    .bind(&record.hijri_date)
    .bind(&record.imsak)
    .bind(&record.subuh)
    .bind(&record.syuruk)
    .bind(&record.dhuha)
    .bind(&record.zohor)
    .bind(&record.asar)
    .bind(&record.maghrib)
    .bind(&record.isyak)
    .fetch_one(pool)
    .await?;

    Ok(if inserted {
        UpsertOutcome::Inserted
    } else {
        UpsertOutcome::Updated
    })
}

/// Returns the most recent row for `zone_code` whose Gregorian date string
/// equals `gregorian_date` exactly, or `None`.
///
/// `zone_code` is matched case-insensitively against the stored bare code.
/// The date is an opaque string: a reader using a different format than the
/// writer will not find the row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_today(
    pool: &PgPool,
    zone_code: &str,
    gregorian_date: &str,
) -> Result<Option<PrayerTimeRow>, DbError> {
    let row = sqlx::query_as::<_, PrayerTimeRow>(
        "SELECT id, zone_code, zone_label, bearing, gregorian_date, hijri_date, \
                imsak, subuh, syuruk, dhuha, zohor, asar, maghrib, isyak, created_at \
         FROM prayer_times \
         WHERE zone_code = UPPER($1) AND gregorian_date = $2 \
         ORDER BY created_at DESC \
         LIMIT 1",
    )
    .bind(zone_code.trim())
    .bind(gregorian_date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns up to `limit` rows for `zone_code`, most recently written first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_history(
    pool: &PgPool,
    zone_code: &str,
    limit: i64,
) -> Result<Vec<PrayerTimeRow>, DbError> {
    let rows = sqlx::query_as::<_, PrayerTimeRow>(
        "SELECT id, zone_code, zone_label, bearing, gregorian_date, hijri_date, \
                imsak, subuh, syuruk, dhuha, zohor, asar, maghrib, isyak, created_at \
         FROM prayer_times \
         WHERE zone_code = UPPER($1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(zone_code.trim())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
