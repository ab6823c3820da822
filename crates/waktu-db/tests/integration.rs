//! Offline unit tests for waktu-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use chrono::Utc;
use waktu_core::{AppConfig, PrayerTimeRecord, SourceKind, ZoneEntry};
use waktu_db::{PoolConfig, PrayerTimeRow, ZoneRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        api_base_url: "http://api.test/?zone=".to_string(),
        page_url: "http://page.test/".to_string(),
        request_timeout_secs: 30,
        settle_delay_ms: 2000,
        default_zone: "WLY01".to_string(),
        max_concurrency: 3,
        source: SourceKind::Api,
        webdriver_url: "http://localhost:9515".to_string(),
        user_agent: "ua".to_string(),
        max_attempts: 3,
        retry_backoff_base_ms: 1000,
        utc_offset_minutes: 480,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        prewarm_cron: "0 5 16 * * *".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout, Duration::from_secs(9));
}

#[test]
fn prayer_time_row_converts_to_record() {
    let created_at = Utc::now();
    let row = PrayerTimeRow {
        id: 1,
        zone_code: "WLY01".to_string(),
        zone_label: "WLY01 - 292° 31′ 29″".to_string(),
        bearing: "292° 31′ 29″".to_string(),
        gregorian_date: "17/10/2026".to_string(),
        hijri_date: "05/05/1448".to_string(),
        imsak: "05:44".to_string(),
        subuh: "05:54".to_string(),
        syuruk: "07:02".to_string(),
        dhuha: String::new(),
        zohor: "13:07".to_string(),
        asar: "16:11".to_string(),
        maghrib: "19:08".to_string(),
        isyak: "20:17".to_string(),
        created_at,
    };

    let record = PrayerTimeRecord::from(row);
    assert_eq!(record.zone_code(), "WLY01");
    assert_eq!(record.created_at, created_at);
    assert!(record.is_minimum_viable());
}

#[test]
fn zone_row_converts_to_entry() {
    let row = ZoneRow {
        id: 7,
        zone_code: "SGR01".to_string(),
        state: "Selangor".to_string(),
        description: "Gombak, Petaling".to_string(),
        created_at: Utc::now(),
    };

    let entry = ZoneEntry::from(row);
    assert_eq!(entry.code, "SGR01");
    assert_eq!(entry.state, "Selangor");
}
