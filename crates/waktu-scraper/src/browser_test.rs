use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::*;

const RENDERED: [&str; 8] = [
    "05:44:00", "05:54:00", "07:02:00", "-", "13:07:00", "16:11:00", "19:08:00", "20:17:00",
];

#[derive(Default)]
struct Counters {
    launches: AtomicU32,
    closes: AtomicU32,
}

struct FakeSession {
    fields: HashMap<&'static str, &'static str>,
    renders: Mutex<VecDeque<Result<Vec<String>, BrowserError>>>,
    fail_navigate: bool,
    counters: Arc<Counters>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&self, _url: &str) -> Result<(), BrowserError> {
        if self.fail_navigate {
            return Err(BrowserError::WebDriver {
                error: "unknown error".to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    async fn select_option(&self, _select_id: &str, _value: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn texts(&self, _css: &str) -> Result<Vec<String>, BrowserError> {
        // Once the script runs out the page stays unrendered.
        self.renders
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec!["-".to_string(); 8]))
    }

    async fn text_by_id(&self, id: &str) -> Result<String, BrowserError> {
        self.fields
            .get(id)
            .map(|v| (*v).to_string())
            .ok_or_else(|| BrowserError::NoSuchElement(format!("#{id}")))
    }

    async fn zone_options(&self, _select_id: &str) -> Result<Vec<ZoneEntry>, BrowserError> {
        Ok(vec![ZoneEntry {
            code: "WLY01".to_string(),
            state: "Wilayah Persekutuan".to_string(),
            description: "Kuala Lumpur, Putrajaya".to_string(),
        }])
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeLauncher {
    renders: Vec<Result<Vec<String>, BrowserError>>,
    fields: HashMap<&'static str, &'static str>,
    fail_navigate: bool,
    counters: Arc<Counters>,
}

impl FakeLauncher {
    fn rendered() -> Self {
        Self {
            renders: vec![Ok(RENDERED.iter().map(|s| (*s).to_string()).collect())],
            fields: wly01_fields(),
            fail_navigate: false,
            counters: Arc::new(Counters::default()),
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        let renders = self
            .renders
            .iter()
            .map(|r| match r {
                Ok(v) => Ok(v.clone()),
                Err(BrowserError::NoSuchElement(m)) => Err(BrowserError::NoSuchElement(m.clone())),
                Err(BrowserError::StaleElement(m)) => Err(BrowserError::StaleElement(m.clone())),
                Err(e) => Err(BrowserError::InvalidResponse(e.to_string())),
            })
            .collect();
        Ok(Box::new(FakeSession {
            fields: self.fields.clone(),
            renders: Mutex::new(renders),
            fail_navigate: self.fail_navigate,
            counters: Arc::clone(&self.counters),
        }))
    }
}

fn wly01_fields() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("czone", "WLY01 - Kuala Lumpur, Putrajaya"),
        ("cbearing", "292&#176; 31&#8242; 29&#8243;"),
        ("timsak", "05:44:00"),
        ("tsubuh", "05:54:00"),
        ("tsyuruk", "07:02:00"),
        ("tdhuha", "-"),
        ("tzohor", "13:07:00"),
        ("tasar", "16:11:00"),
        ("tmagrib", "19:08:00"),
        ("tisyak", "20:17:00"),
    ])
}

fn config() -> BrowserSourceConfig {
    BrowserSourceConfig {
        page_url: "https://www.e-solat.gov.my/".to_string(),
        settle_delay: Duration::from_millis(2000),
        render_timeout: Duration::from_secs(30),
        utc_offset_minutes: 480,
    }
}

#[tokio::test(start_paused = true)]
async fn fetch_reads_and_normalizes_fields() {
    let launcher = FakeLauncher::rendered();
    let counters = Arc::clone(&launcher.counters);
    let source = BrowserSource::new(launcher, config());

    let record = source.fetch("wly01").await.expect("fetch should succeed");

    assert_eq!(record.zone_label, "WLY01 - Kuala Lumpur, Putrajaya");
    assert_eq!(record.bearing, "292° 31′ 29″");
    assert_eq!(record.subuh, "05:54");
    assert_eq!(record.isyak, "20:17");
    assert_eq!(record.dhuha, "07:17", "placeholder dhuha is derived");
    assert_eq!(record.gregorian_date, today_gregorian(480));
    assert_eq!(record.hijri_date, today_hijri(480));
    assert_eq!(record.validate("WLY01"), Ok(()));
    assert_eq!(counters.launches.load(Ordering::SeqCst), 1);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn render_poll_rides_out_transient_dom_errors() {
    let mut launcher = FakeLauncher::rendered();
    launcher.renders.insert(0, Err(BrowserError::NoSuchElement("cells".into())));
    launcher.renders.insert(1, Err(BrowserError::StaleElement("cells".into())));
    launcher.renders.insert(2, Ok(vec!["00:00:00".to_string(); 8]));
    let source = BrowserSource::new(launcher, config());

    let record = source.fetch("WLY01").await;
    assert!(record.is_ok(), "expected Ok, got: {record:?}");
}

#[tokio::test(start_paused = true)]
async fn render_timeout_is_reported_and_session_closed() {
    let mut launcher = FakeLauncher::rendered();
    launcher.renders.clear();
    let counters = Arc::clone(&launcher.counters);
    let source = BrowserSource::new(launcher, config());

    let err = source.fetch("WLY01").await.unwrap_err();

    assert!(matches!(err, ScraperError::Timeout { waited_ms: 30_000, .. }));
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_failure_still_closes_session() {
    let mut launcher = FakeLauncher::rendered();
    launcher.fail_navigate = true;
    let counters = Arc::clone(&launcher.counters);
    let source = BrowserSource::new(launcher, config());

    let err = source.fetch("WLY01").await.unwrap_err();

    assert!(matches!(err, ScraperError::Browser(BrowserError::WebDriver { .. })));
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_elements_read_as_empty() {
    let mut launcher = FakeLauncher::rendered();
    launcher.fields.remove("tasar");
    let source = BrowserSource::new(launcher, config());

    let record = source.fetch("WLY01").await.expect("fetch should succeed");

    assert_eq!(record.asar, "");
    assert!(!record.is_minimum_viable());
}

#[tokio::test(start_paused = true)]
async fn cancelled_fetch_releases_session() {
    let mut launcher = FakeLauncher::rendered();
    launcher.renders.clear();
    let counters = Arc::clone(&launcher.counters);
    let source = BrowserSource::new(launcher, config());

    let outcome = tokio::time::timeout(Duration::from_secs(5), source.fetch("WLY01")).await;
    assert!(outcome.is_err(), "fetch should still be polling");

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn zone_catalog_is_read_from_dropdown() {
    let launcher = FakeLauncher::rendered();
    let counters = Arc::clone(&launcher.counters);
    let source = BrowserSource::new(launcher, config());

    let zones = source.fetch_zone_catalog().await.expect("catalog");

    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].code, "WLY01");
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}
