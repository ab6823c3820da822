//! JSON API backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use waktu_core::PrayerTimeRecord;

use crate::error::ScraperError;
use crate::normalize::normalize_takwim;
use crate::source::PrayerTimeSource;
use crate::types::TakwimResponse;

/// Fetches schedules from the `takwimsolat` JSON endpoint.
///
/// The request URL is `base_url` with the uppercased zone code appended, so
/// `base_url` normally ends in `zone=`.
pub struct ApiSource {
    client: Client,
    base_url: String,
}

impl ApiSource {
    /// Creates an `ApiSource` with the given timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn zone_url(&self, zone_code: &str) -> String {
        format!("{}{}", self.base_url, zone_code.trim().to_uppercase())
    }
}

#[async_trait]
impl PrayerTimeSource for ApiSource {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn fetch(&self, zone_code: &str) -> Result<PrayerTimeRecord, ScraperError> {
        let url = self.zone_url(zone_code);
        tracing::debug!(zone = zone_code, url = %url, "fetching takwim");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<TakwimResponse>(&body).map_err(|e| {
            ScraperError::Deserialize {
                context: format!("takwim for {zone_code}"),
                source: e,
            }
        })?;

        normalize_takwim(zone_code, parsed)
    }
}
