pub mod app_config;
pub mod config;
pub mod dates;
pub mod hijri;
pub mod prayer_times;
pub mod zones;

pub use app_config::{AppConfig, SourceKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use dates::{derive_dhuha, normalize_time, today_gregorian, today_hijri};
pub use prayer_times::{bare_zone_code, PrayerTimeRecord, ValidationError};
pub use zones::{builtin_zones, group_zones, ZoneEntry, ZoneGroup, ZoneOption};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
