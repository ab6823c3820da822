use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use waktu_core::PrayerTimeRecord;

use crate::middleware::RequestId;

use super::{map_sync_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct TodayQuery {
    pub zone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    pub limit: Option<u32>,
}

/// Today's record; fetched and stored on a cache miss.
pub(super) async fn today(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<ApiResponse<PrayerTimeRecord>>, ApiError> {
    let record = state
        .service
        .get_or_fetch(query.zone.as_deref())
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, record))
}

pub(super) async fn history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(zone): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<PrayerTimeRecord>>>, ApiError> {
    let rows = state
        .service
        .history(&zone, query.limit)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, rows))
}

pub(super) async fn refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(zone): Path<String>,
) -> Result<Json<ApiResponse<PrayerTimeRecord>>, ApiError> {
    let record = state
        .service
        .force_refresh(&zone)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, record))
}
