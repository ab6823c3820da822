use crate::app_config::{AppConfig, SourceKind};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_positive_u64 = |var: &str, raw: &str| -> Result<u64, ConfigError> {
        let value = raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than 0".to_string()));
        }
        Ok(value)
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let api_base_url = require("WAKTU_API_BASE_URL")?;
    let page_url = require("WAKTU_PAGE_URL")?;
    let request_timeout_secs = parse_positive_u64(
        "WAKTU_REQUEST_TIMEOUT_SECS",
        &require("WAKTU_REQUEST_TIMEOUT_SECS")?,
    )?;
    let settle_delay_ms =
        parse_positive_u64("WAKTU_SETTLE_DELAY_MS", &require("WAKTU_SETTLE_DELAY_MS")?)?;
    let default_zone = require("WAKTU_DEFAULT_ZONE")?.to_uppercase();
    let max_concurrency =
        parse_positive_u64("WAKTU_MAX_CONCURRENCY", &require("WAKTU_MAX_CONCURRENCY")?)?;
    let max_concurrency = usize::try_from(max_concurrency)
        .map_err(|e| invalid("WAKTU_MAX_CONCURRENCY", e.to_string()))?;

    let source = parse_source_kind(&or_default("WAKTU_SOURCE", "api"))?;
    let webdriver_url = or_default("WAKTU_WEBDRIVER_URL", "http://localhost:9515");
    let user_agent = or_default("WAKTU_USER_AGENT", DEFAULT_USER_AGENT);

    let max_attempts = parse_u32("WAKTU_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(invalid(
            "WAKTU_MAX_ATTEMPTS",
            "must be greater than 0".to_string(),
        ));
    }
    let retry_backoff_base_ms = parse_u64("WAKTU_RETRY_BACKOFF_BASE_MS", "1000")?;

    let utc_offset_minutes = or_default("WAKTU_UTC_OFFSET_MINUTES", "480")
        .parse::<i32>()
        .map_err(|e| invalid("WAKTU_UTC_OFFSET_MINUTES", e.to_string()))?;
    if !(-14 * 60..=14 * 60).contains(&utc_offset_minutes) {
        return Err(invalid(
            "WAKTU_UTC_OFFSET_MINUTES",
            "must be within +/- 14 hours".to_string(),
        ));
    }

    let bind_addr = or_default("WAKTU_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("WAKTU_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("WAKTU_LOG_LEVEL", "info");
    let prewarm_cron = or_default("WAKTU_PREWARM_CRON", "0 5 16 * * *");

    let db_max_connections = parse_u32("WAKTU_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("WAKTU_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("WAKTU_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        api_base_url,
        page_url,
        request_timeout_secs,
        settle_delay_ms,
        default_zone,
        max_concurrency,
        source,
        webdriver_url,
        user_agent,
        max_attempts,
        retry_backoff_base_ms,
        utc_offset_minutes,
        bind_addr,
        log_level,
        prewarm_cron,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse `WAKTU_SOURCE` into a [`SourceKind`].
fn parse_source_kind(s: &str) -> Result<SourceKind, ConfigError> {
    match s.trim() {
        "api" => Ok(SourceKind::Api),
        "browser" => Ok(SourceKind::Browser),
        "api-with-browser-fallback" => Ok(SourceKind::ApiWithBrowserFallback),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WAKTU_SOURCE".to_string(),
            reason: format!(
                "unknown source \"{other}\"; expected api, browser, or api-with-browser-fallback"
            ),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
