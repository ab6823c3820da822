//! Persistence seam for the service.
//!
//! [`PgStore`] is the production implementation over `waktu-db`;
//! [`MemoryStore`] keeps the same keying rules in process.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use waktu_core::{PrayerTimeRecord, ZoneEntry};
use waktu_db::{DbError, UpsertOutcome};

/// Reconciling store keyed on `(bare zone code, gregorian date)`.
#[async_trait]
pub trait PrayerTimeStore: Send + Sync {
    /// Inserts the record or rewrites the existing row for its key.
    async fn upsert(&self, record: &PrayerTimeRecord) -> Result<UpsertOutcome, DbError>;

    /// Most recent row for `zone_code` whose date string equals
    /// `gregorian_date` exactly.
    async fn find_today(
        &self,
        zone_code: &str,
        gregorian_date: &str,
    ) -> Result<Option<PrayerTimeRecord>, DbError>;

    /// Up to `limit` rows for `zone_code`, newest first.
    async fn find_history(
        &self,
        zone_code: &str,
        limit: i64,
    ) -> Result<Vec<PrayerTimeRecord>, DbError>;

    /// Clear-and-reinsert of the whole zone catalog.
    async fn replace_zones(&self, entries: &[ZoneEntry]) -> Result<usize, DbError>;

    /// Catalog ordered by state, then code.
    async fn list_zones(&self) -> Result<Vec<ZoneEntry>, DbError>;

    /// Connectivity check.
    async fn ping(&self) -> Result<(), DbError>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PrayerTimeStore for PgStore {
    async fn upsert(&self, record: &PrayerTimeRecord) -> Result<UpsertOutcome, DbError> {
        waktu_db::upsert_prayer_time(&self.pool, record).await
    }

    async fn find_today(
        &self,
        zone_code: &str,
        gregorian_date: &str,
    ) -> Result<Option<PrayerTimeRecord>, DbError> {
        let row = waktu_db::find_today(&self.pool, zone_code, gregorian_date).await?;
        Ok(row.map(PrayerTimeRecord::from))
    }

    async fn find_history(
        &self,
        zone_code: &str,
        limit: i64,
    ) -> Result<Vec<PrayerTimeRecord>, DbError> {
        let rows = waktu_db::find_history(&self.pool, zone_code, limit).await?;
        Ok(rows.into_iter().map(PrayerTimeRecord::from).collect())
    }

    async fn replace_zones(&self, entries: &[ZoneEntry]) -> Result<usize, DbError> {
        waktu_db::replace_zones(&self.pool, entries).await
    }

    async fn list_zones(&self) -> Result<Vec<ZoneEntry>, DbError> {
        let rows = waktu_db::list_zones(&self.pool).await?;
        Ok(rows.into_iter().map(ZoneEntry::from).collect())
    }

    async fn ping(&self) -> Result<(), DbError> {
        waktu_db::health_check(&self.pool).await
    }
}

/// In-process store with the same identity rules as [`PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(String, String), PrayerTimeRecord>>,
    zones: Mutex<Vec<ZoneEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored prayer-time rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PrayerTimeStore for MemoryStore {
    async fn upsert(&self, record: &PrayerTimeRecord) -> Result<UpsertOutcome, DbError> {
        let key = (record.zone_code(), record.gregorian_date.clone());
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);

        let outcome = if let Some(existing) = records.get_mut(&key) {
            existing.bearing.clone_from(&record.bearing);
            existing.hijri_date.clone_from(&record.hijri_date);
            existing.imsak.clone_from(&record.imsak);
            existing.subuh.clone_from(&record.subuh);
            existing.syuruk.clone_from(&record.syuruk);
            existing.dhuha.clone_from(&record.dhuha);
            existing.zohor.clone_from(&record.zohor);
            existing.asar.clone_from(&record.asar);
            existing.maghrib.clone_from(&record.maghrib);
            existing.isyak.clone_from(&record.isyak);
            existing.created_at = Utc::now();
            UpsertOutcome::Updated
        } else {
            let mut stored = record.clone();
            stored.created_at = Utc::now();
            records.insert(key, stored);
            UpsertOutcome::Inserted
        };

        Ok(outcome)
    }

    async fn find_today(
        &self,
        zone_code: &str,
        gregorian_date: &str,
    ) -> Result<Option<PrayerTimeRecord>, DbError> {
        let key = (zone_code.trim().to_uppercase(), gregorian_date.to_string());
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(&key).cloned())
    }

    async fn find_history(
        &self,
        zone_code: &str,
        limit: i64,
    ) -> Result<Vec<PrayerTimeRecord>, DbError> {
        let zone = zone_code.trim().to_uppercase();
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<PrayerTimeRecord> = records
            .iter()
            .filter(|((code, _), _)| *code == zone)
            .map(|(_, r)| r.clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(rows)
    }

    async fn replace_zones(&self, entries: &[ZoneEntry]) -> Result<usize, DbError> {
        let mut by_code: HashMap<String, ZoneEntry> = HashMap::new();
        for entry in entries {
            let code = entry.code.trim().to_uppercase();
            by_code.insert(
                code.clone(),
                ZoneEntry {
                    code,
                    state: entry.state.trim().to_string(),
                    description: entry.description.trim().to_string(),
                },
            );
        }
        let mut catalog: Vec<ZoneEntry> = by_code.into_values().collect();
        catalog.sort_by(|a, b| (&a.state, &a.code).cmp(&(&b.state, &b.code)));

        let count = catalog.len();
        *self.zones.lock().unwrap_or_else(PoisonError::into_inner) = catalog;
        Ok(count)
    }

    async fn list_zones(&self) -> Result<Vec<ZoneEntry>, DbError> {
        Ok(self.zones.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}
