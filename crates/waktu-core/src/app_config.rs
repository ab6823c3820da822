use std::net::SocketAddr;

/// Which extraction backend(s) the orchestrator should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JSON API mirror only.
    Api,
    /// Headless browser driven over WebDriver only.
    Browser,
    /// JSON API first, browser when the API attempt fails.
    ApiWithBrowserFallback,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Api => write!(f, "api"),
            SourceKind::Browser => write!(f, "browser"),
            SourceKind::ApiWithBrowserFallback => write!(f, "api-with-browser-fallback"),
        }
    }
}

impl SourceKind {
    /// Returns `true` when this selection needs a WebDriver endpoint.
    #[must_use]
    pub fn uses_browser(self) -> bool {
        !matches!(self, SourceKind::Api)
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub api_base_url: String,
    pub page_url: String,
    pub request_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub default_zone: String,
    pub max_concurrency: usize,
    pub source: SourceKind,
    pub webdriver_url: String,
    pub user_agent: String,
    pub max_attempts: u32,
    pub retry_backoff_base_ms: u64,
    pub utc_offset_minutes: i32,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub prewarm_cron: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("page_url", &self.page_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("default_zone", &self.default_zone)
            .field("max_concurrency", &self.max_concurrency)
            .field("source", &self.source)
            .field("webdriver_url", &self.webdriver_url)
            .field("user_agent", &self.user_agent)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("prewarm_cron", &self.prewarm_cron)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
