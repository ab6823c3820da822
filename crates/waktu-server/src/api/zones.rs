use axum::{extract::State, Extension, Json};
use waktu_core::ZoneGroup;

use crate::middleware::RequestId;

use super::{map_sync_error, ApiError, ApiResponse, AppState};

/// Catalog grouped by state; an empty catalog is refreshed first.
pub(super) async fn list_zones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ZoneGroup>>>, ApiError> {
    let groups = state
        .service
        .zones_grouped()
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, groups))
}

pub(super) async fn refresh_zones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ZoneGroup>>>, ApiError> {
    let groups = state
        .service
        .refresh_catalog()
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, groups))
}
