use thiserror::Error;
use waktu_db::DbError;
use waktu_scraper::FetchFailure;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Every fetch attempt failed; the caller should retry later.
    #[error("source unavailable, try again: {0}")]
    SourceUnavailable(#[from] FetchFailure),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("zone code must not be blank")]
    BlankZone,

    #[error("no zones found for state \"{0}\"")]
    StateNotFound(String),
}
