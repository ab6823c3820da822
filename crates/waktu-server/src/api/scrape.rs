use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use waktu_sync::{BatchOptions, BatchSummary};

use crate::middleware::RequestId;

use super::{map_sync_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ScrapeQuery {
    pub parallel: Option<bool>,
    pub concurrency: Option<usize>,
    pub retry_failed: Option<bool>,
}

impl ScrapeQuery {
    pub(super) fn options(&self) -> BatchOptions {
        let defaults = BatchOptions::default();
        BatchOptions {
            parallel: self.parallel.unwrap_or(defaults.parallel),
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            retry_failed: self.retry_failed.unwrap_or(defaults.retry_failed),
            ..defaults
        }
    }
}

pub(super) async fn scrape_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<ApiResponse<BatchSummary>>, ApiError> {
    let cancel = state.shutdown.child_token();
    let summary = state
        .service
        .scrape_all(&query.options(), &cancel)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, summary))
}

pub(super) async fn scrape_state(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(state_name): Path<String>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<ApiResponse<BatchSummary>>, ApiError> {
    let cancel = state.shutdown.child_token();
    let summary = state
        .service
        .scrape_state(&state_name, &query.options(), &cancel)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, summary))
}
