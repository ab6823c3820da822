use async_trait::async_trait;
use waktu_core::{PrayerTimeRecord, ZoneEntry};

use crate::error::ScraperError;

/// Anything that can produce one zone's schedule for today.
///
/// Implementations do a single attempt; retries and validation live in
/// [`crate::retry::fetch_with_retry`].
#[async_trait]
pub trait PrayerTimeSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches today's record for `zone_code`.
    async fn fetch(&self, zone_code: &str) -> Result<PrayerTimeRecord, ScraperError>;

    /// Reads the zone catalog from the source, if it publishes one.
    ///
    /// The default returns an empty list, meaning "not supported".
    async fn fetch_zone_catalog(&self) -> Result<Vec<ZoneEntry>, ScraperError> {
        Ok(Vec::new())
    }
}
