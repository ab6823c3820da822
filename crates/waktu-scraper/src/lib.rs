pub mod api;
pub mod browser;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod retry;
pub mod source;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use waktu_core::{AppConfig, SourceKind};

pub use api::ApiSource;
pub use browser::{BrowserLauncher, BrowserSession, BrowserSource, BrowserSourceConfig};
pub use browser::{WebDriverLauncher, WebDriverSession};
pub use error::{BrowserError, ScraperError};
pub use fallback::FallbackSource;
pub use normalize::normalize_takwim;
pub use retry::{fetch_with_retry, FetchFailure, RetryPolicy};
pub use source::PrayerTimeSource;
pub use types::{TakwimDay, TakwimResponse};

/// Builds the source selected by `config.source`.
///
/// # Errors
///
/// Returns [`ScraperError`] if an HTTP client cannot be constructed.
pub fn build_source(config: &AppConfig) -> Result<Arc<dyn PrayerTimeSource>, ScraperError> {
    let api = || -> Result<Arc<dyn PrayerTimeSource>, ScraperError> {
        Ok(Arc::new(ApiSource::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?))
    };

    let browser = || -> Result<Arc<dyn PrayerTimeSource>, ScraperError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let launcher = WebDriverLauncher::new(&config.webdriver_url, &config.user_agent, timeout)?;
        Ok(Arc::new(BrowserSource::new(
            launcher,
            BrowserSourceConfig {
                page_url: config.page_url.clone(),
                settle_delay: Duration::from_millis(config.settle_delay_ms),
                render_timeout: timeout,
                utc_offset_minutes: config.utc_offset_minutes,
            },
        )))
    };

    match config.source {
        SourceKind::Api => api(),
        SourceKind::Browser => browser(),
        SourceKind::ApiWithBrowserFallback => Ok(Arc::new(FallbackSource::new(api()?, browser()?))),
    }
}

/// Retry policy from `WAKTU_MAX_ATTEMPTS` / `WAKTU_RETRY_BACKOFF_BASE_MS`.
#[must_use]
pub fn retry_policy(config: &AppConfig) -> RetryPolicy {
    RetryPolicy::new(
        config.max_attempts,
        Duration::from_millis(config.retry_backoff_base_ms),
    )
}
