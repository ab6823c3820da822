//! Orchestration layer: reconciling store, cache-or-fetch service and the
//! batch scheduler.

pub mod batch;
pub mod error;
pub mod service;
pub mod store;

pub use batch::{run_batch, BatchOptions, BatchSummary, ScrapeOutcome, CANCELLED};
pub use error::SyncError;
pub use service::{PrayerTimeService, ServiceConfig, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
pub use store::{MemoryStore, PgStore, PrayerTimeStore};
pub use tokio_util::sync::CancellationToken;
