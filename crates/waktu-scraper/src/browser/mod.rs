//! Browser-automation backend.
//!
//! Drives a page through a [`BrowserSession`]: navigate, select the zone in
//! the dropdown, poll until the timetable renders, then read fixed element
//! ids. Each fetch owns its own session and always releases it.

mod webdriver;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use waktu_core::dates::decode_bearing_entities;
use waktu_core::{derive_dhuha, normalize_time, today_gregorian, today_hijri};
use waktu_core::{PrayerTimeRecord, ZoneEntry};

use crate::error::{BrowserError, ScraperError};
use crate::source::PrayerTimeSource;

pub use webdriver::{WebDriverLauncher, WebDriverSession};

const ZONE_SELECT_ID: &str = "inputzone";
const RENDERED_TIMES_CSS: &str = ".timetablerow .masa-solat";
const MIN_RENDERED_TIMES: usize = 7;
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const POST_SELECT_EXTRA: Duration = Duration::from_millis(500);

/// Page primitives the backend needs from a browser.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Selects the `<option>` with `value` inside `<select id=select_id>`.
    async fn select_option(&self, select_id: &str, value: &str) -> Result<(), BrowserError>;

    /// Visible text of every element matching `css`.
    async fn texts(&self, css: &str) -> Result<Vec<String>, BrowserError>;

    async fn text_by_id(&self, id: &str) -> Result<String, BrowserError>;

    /// Reads `<optgroup label=state><option value=code>description` pairs.
    async fn zone_options(&self, select_id: &str) -> Result<Vec<ZoneEntry>, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;
}

/// Hands out one fresh session per call.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// Owns a session for the duration of one unit of work.
///
/// [`SessionGuard::release`] closes it explicitly. If the guard is dropped
/// first (error path, panic, or the enclosing future being cancelled) the
/// close is spawned onto the current runtime instead.
struct SessionGuard {
    session: Arc<dyn BrowserSession>,
    released: bool,
}

impl SessionGuard {
    fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Arc::from(session),
            released: false,
        }
    }

    fn session(&self) -> &dyn BrowserSession {
        self.session.as_ref()
    }

    async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.session.close().await {
            tracing::warn!(error = %e, "failed to close browser session");
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let session = Arc::clone(&self.session);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = session.close().await {
                    tracing::warn!(error = %e, "failed to close abandoned browser session");
                }
            });
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserSourceConfig {
    pub page_url: String,
    pub settle_delay: Duration,
    pub render_timeout: Duration,
    pub utc_offset_minutes: i32,
}

/// [`PrayerTimeSource`] backed by browser automation.
pub struct BrowserSource<L> {
    launcher: L,
    config: BrowserSourceConfig,
}

impl<L: BrowserLauncher> BrowserSource<L> {
    #[must_use]
    pub fn new(launcher: L, config: BrowserSourceConfig) -> Self {
        Self { launcher, config }
    }

    async fn scrape(
        &self,
        session: &dyn BrowserSession,
        zone: &str,
    ) -> Result<PrayerTimeRecord, ScraperError> {
        session.navigate(&self.config.page_url).await?;
        tokio::time::sleep(self.config.settle_delay).await;

        session.select_option(ZONE_SELECT_ID, zone).await?;
        tokio::time::sleep(self.config.settle_delay + POST_SELECT_EXTRA).await;

        self.wait_for_render(session).await?;

        let read = |id: &'static str| read_field(session, id);
        let zone_label = read("czone").await?;
        let bearing = decode_bearing_entities(&read("cbearing").await?);
        let syuruk = normalize_time(&read("tsyuruk").await?);
        let dhuha = match normalize_time(&read("tdhuha").await?) {
            d if d.is_empty() => derive_dhuha(&syuruk).unwrap_or_default(),
            d => d,
        };

        Ok(PrayerTimeRecord {
            zone_label,
            bearing,
            gregorian_date: today_gregorian(self.config.utc_offset_minutes),
            hijri_date: today_hijri(self.config.utc_offset_minutes),
            imsak: normalize_time(&read("timsak").await?),
            subuh: normalize_time(&read("tsubuh").await?),
            syuruk,
            dhuha,
            zohor: normalize_time(&read("tzohor").await?),
            asar: normalize_time(&read("tasar").await?),
            maghrib: normalize_time(&read("tmagrib").await?),
            isyak: normalize_time(&read("tisyak").await?),
            created_at: Utc::now(),
        })
    }

    /// Polls until enough timetable cells hold a real value.
    async fn wait_for_render(&self, session: &dyn BrowserSession) -> Result<(), ScraperError> {
        let poll = async {
            loop {
                match session.texts(RENDERED_TIMES_CSS).await {
                    Ok(texts) => {
                        let rendered = texts.iter().filter(|t| is_present(t)).count();
                        if rendered >= MIN_RENDERED_TIMES {
                            return Ok(());
                        }
                    }
                    Err(e) if e.is_transient_dom() => {}
                    Err(e) => return Err(ScraperError::from(e)),
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(self.config.render_timeout, poll)
            .await
            .map_err(|_| ScraperError::Timeout {
                what: "timetable to render".to_string(),
                waited_ms: u64::try_from(self.config.render_timeout.as_millis())
                    .unwrap_or(u64::MAX),
            })?
    }
}

#[async_trait]
impl<L: BrowserLauncher> PrayerTimeSource for BrowserSource<L> {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch(&self, zone_code: &str) -> Result<PrayerTimeRecord, ScraperError> {
        let zone = zone_code.trim().to_uppercase();
        let guard = SessionGuard::new(self.launcher.launch().await?);
        let result = self.scrape(guard.session(), &zone).await;
        guard.release().await;
        result
    }

    async fn fetch_zone_catalog(&self) -> Result<Vec<ZoneEntry>, ScraperError> {
        let guard = SessionGuard::new(self.launcher.launch().await?);
        let session = guard.session();
        let result = async {
            session.navigate(&self.config.page_url).await?;
            tokio::time::sleep(self.config.settle_delay).await;
            Ok::<_, ScraperError>(session.zone_options(ZONE_SELECT_ID).await?)
        }
        .await;
        guard.release().await;
        result
    }
}

/// Reads one field by element id; a missing element or a placeholder value
/// reads as empty.
async fn read_field(session: &dyn BrowserSession, id: &str) -> Result<String, ScraperError> {
    match session.text_by_id(id).await {
        Ok(text) if is_present(&text) => Ok(text.trim().to_string()),
        Ok(_) | Err(BrowserError::NoSuchElement(_)) => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

fn is_present(text: &str) -> bool {
    let t = text.trim();
    !t.is_empty() && t != "-" && t != "00:00:00"
}

#[cfg(test)]
#[path = "../browser_test.rs"]
mod tests;
