//! Cache-or-fetch orchestration over a source and a store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use waktu_core::{builtin_zones, group_zones, today_gregorian, AppConfig};
use waktu_core::{PrayerTimeRecord, ZoneEntry, ZoneGroup};
use waktu_scraper::{fetch_with_retry, retry_policy, PrayerTimeSource, RetryPolicy};

use crate::batch::{run_batch, BatchOptions, BatchSummary};
use crate::error::SyncError;
use crate::store::PrayerTimeStore;

pub const DEFAULT_HISTORY_LIMIT: u32 = 7;
pub const MAX_HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub retry: RetryPolicy,
    pub utc_offset_minutes: i32,
    pub default_zone: String,
    pub max_concurrency: usize,
}

impl ServiceConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            retry: retry_policy(config),
            utc_offset_minutes: config.utc_offset_minutes,
            default_zone: config.default_zone.clone(),
            max_concurrency: config.max_concurrency,
        }
    }
}

pub struct PrayerTimeService {
    source: Arc<dyn PrayerTimeSource>,
    store: Arc<dyn PrayerTimeStore>,
    config: ServiceConfig,
}

impl PrayerTimeService {
    #[must_use]
    pub fn new(
        source: Arc<dyn PrayerTimeSource>,
        store: Arc<dyn PrayerTimeStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Name of the extraction backend in use.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// # Errors
    ///
    /// [`SyncError::Store`] when the store is unreachable.
    pub async fn health_check(&self) -> Result<(), SyncError> {
        Ok(self.store.ping().await?)
    }

    /// Uppercased `zone_code`, or the configured default when blank or absent.
    #[must_use]
    pub fn resolve_zone(&self, zone_code: Option<&str>) -> String {
        match zone_code.map(str::trim) {
            Some(code) if !code.is_empty() => code.to_uppercase(),
            _ => self.config.default_zone.trim().to_uppercase(),
        }
    }

    /// Today's record for the zone, fetching and storing it on a cache miss.
    ///
    /// A stored row without the core prayer times is treated as a miss.
    ///
    /// # Errors
    ///
    /// [`SyncError::SourceUnavailable`] when every fetch attempt failed,
    /// [`SyncError::Store`] on database failure.
    pub async fn get_or_fetch(&self, zone_code: Option<&str>) -> Result<PrayerTimeRecord, SyncError> {
        let zone = self.resolve_zone(zone_code);
        let today = today_gregorian(self.config.utc_offset_minutes);

        if let Some(cached) = self.store.find_today(&zone, &today).await? {
            if cached.is_minimum_viable() {
                tracing::debug!(zone = %zone, date = %today, "cache hit");
                return Ok(cached);
            }
            tracing::info!(zone = %zone, date = %today, "cached row incomplete, refetching");
        }

        self.force_refresh(&zone).await
    }

    /// Fetches the zone regardless of what is stored, then upserts it.
    ///
    /// Returns the fetched record, not a re-read of the row.
    ///
    /// # Errors
    ///
    /// [`SyncError::BlankZone`] when `zone_code` is empty or whitespace,
    /// [`SyncError::SourceUnavailable`] when every fetch attempt failed,
    /// [`SyncError::Store`] on database failure.
    pub async fn force_refresh(&self, zone_code: &str) -> Result<PrayerTimeRecord, SyncError> {
        let zone = explicit_zone(zone_code)?;
        let record = fetch_with_retry(self.source.as_ref(), &zone, self.config.retry).await?;
        let outcome = self.store.upsert(&record).await?;
        tracing::info!(
            zone = %zone,
            date = %record.gregorian_date,
            outcome = ?outcome,
            "stored prayer times"
        );
        Ok(record)
    }

    /// Most recent stored rows for a zone. `limit` defaults to 7 and is
    /// clamped to `1..=100`.
    ///
    /// # Errors
    ///
    /// [`SyncError::BlankZone`] when `zone_code` is empty or whitespace,
    /// [`SyncError::Store`] on database failure.
    pub async fn history(
        &self,
        zone_code: &str,
        limit: Option<u32>,
    ) -> Result<Vec<PrayerTimeRecord>, SyncError> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        let zone = explicit_zone(zone_code)?;
        Ok(self.store.find_history(&zone, i64::from(limit)).await?)
    }

    /// Grouped catalog; refreshes first when the stored catalog is empty.
    ///
    /// # Errors
    ///
    /// [`SyncError::Store`] on database failure.
    pub async fn zones_grouped(&self) -> Result<Vec<ZoneGroup>, SyncError> {
        let zones = self.store.list_zones().await?;
        if zones.is_empty() {
            tracing::info!("zone catalog empty, refreshing");
            return self.refresh_catalog().await;
        }
        Ok(group_zones(&zones))
    }

    /// Replaces the stored catalog with the source's dropdown, or the
    /// built-in list when the source yields nothing.
    ///
    /// # Errors
    ///
    /// [`SyncError::Store`] on database failure.
    pub async fn refresh_catalog(&self) -> Result<Vec<ZoneGroup>, SyncError> {
        let scraped = match self.source.fetch_zone_catalog().await {
            Ok(zones) => zones,
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "zone catalog scrape failed");
                Vec::new()
            }
        };

        let catalog = if scraped.is_empty() {
            tracing::info!("using built-in zone catalog");
            builtin_zones()
        } else {
            scraped
        };

        let stored = self.store.replace_zones(&catalog).await?;
        tracing::info!(zones = stored, "zone catalog replaced");
        Ok(group_zones(&self.store.list_zones().await?))
    }

    /// Refreshes every zone in the catalog.
    ///
    /// # Errors
    ///
    /// [`SyncError::Store`] if the catalog cannot be read. Per-zone failures
    /// are reported inside the summary.
    pub async fn scrape_all(
        &self,
        options: &BatchOptions,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, SyncError> {
        let zones = self.catalog().await?;
        let codes: Vec<String> = zones.into_iter().map(|z| z.code).collect();
        Ok(self.run(&codes, options, cancel).await)
    }

    /// Refreshes the zones of one state, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// [`SyncError::StateNotFound`] when no catalog zone has that state,
    /// [`SyncError::Store`] if the catalog cannot be read.
    pub async fn scrape_state(
        &self,
        state: &str,
        options: &BatchOptions,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, SyncError> {
        let wanted = state.trim().to_lowercase();
        let codes: Vec<String> = self
            .catalog()
            .await?
            .into_iter()
            .filter(|z| z.state.trim().to_lowercase() == wanted)
            .map(|z| z.code)
            .collect();

        if codes.is_empty() {
            return Err(SyncError::StateNotFound(state.trim().to_string()));
        }
        Ok(self.run(&codes, options, cancel).await)
    }

    async fn catalog(&self) -> Result<Vec<ZoneEntry>, SyncError> {
        let zones = self.store.list_zones().await?;
        if !zones.is_empty() {
            return Ok(zones);
        }
        self.refresh_catalog().await?;
        Ok(self.store.list_zones().await?)
    }

    async fn run(
        &self,
        codes: &[String],
        options: &BatchOptions,
        cancel: &CancellationToken,
    ) -> BatchSummary {
        run_batch(codes, options, self.config.max_concurrency, cancel, |zone| async move {
            self.force_refresh(&zone).await
        })
        .await
    }
}

/// Uppercased, trimmed zone code; callers that name a zone must name one.
fn explicit_zone(zone_code: &str) -> Result<String, SyncError> {
    let zone = zone_code.trim().to_uppercase();
    if zone.is_empty() {
        return Err(SyncError::BlankZone);
    }
    Ok(zone)
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
