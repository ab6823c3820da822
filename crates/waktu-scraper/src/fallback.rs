use std::sync::Arc;

use async_trait::async_trait;
use waktu_core::{PrayerTimeRecord, ZoneEntry};

use crate::error::ScraperError;
use crate::source::PrayerTimeSource;

/// Tries `primary` first and falls back to `fallback` when the primary
/// attempt errors or returns data that fails validation.
pub struct FallbackSource {
    primary: Arc<dyn PrayerTimeSource>,
    fallback: Arc<dyn PrayerTimeSource>,
}

impl FallbackSource {
    #[must_use]
    pub fn new(primary: Arc<dyn PrayerTimeSource>, fallback: Arc<dyn PrayerTimeSource>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl PrayerTimeSource for FallbackSource {
    fn name(&self) -> &'static str {
        "api-with-browser-fallback"
    }

    async fn fetch(&self, zone_code: &str) -> Result<PrayerTimeRecord, ScraperError> {
        let primary_err = match self.primary.fetch(zone_code).await {
            Ok(record) => match record.validate(zone_code) {
                Ok(()) => return Ok(record),
                Err(e) => ScraperError::from(e),
            },
            Err(e) => e,
        };

        tracing::info!(
            zone = zone_code,
            primary = self.primary.name(),
            fallback = self.fallback.name(),
            error = %primary_err,
            "primary source failed, trying fallback"
        );
        self.fallback.fetch(zone_code).await
    }

    async fn fetch_zone_catalog(&self) -> Result<Vec<ZoneEntry>, ScraperError> {
        match self.primary.fetch_zone_catalog().await {
            Ok(zones) if !zones.is_empty() => Ok(zones),
            Ok(_) => self.fallback.fetch_zone_catalog().await,
            Err(e) => {
                tracing::info!(error = %e, "primary zone catalog read failed, trying fallback");
                self.fallback.fetch_zone_catalog().await
            }
        }
    }
}
