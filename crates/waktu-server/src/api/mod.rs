mod prayer_times;
mod scrape;
mod zones;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use waktu_sync::{PrayerTimeService, SyncError};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PrayerTimeService>,
    /// Cancelled on shutdown; batch requests stop dispatching new zones.
    pub shutdown: CancellationToken,
}

/// Envelope for every successful response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn stamped(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::stamped(request_id),
        })
    }
}

/// Machine-readable failure class; decides the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    SourceUnavailable,
    InternalError,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::SourceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
            },
            meta: ResponseMeta::stamped(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.error.code.status(), Json(self)).into_response()
    }
}

/// Source failures surface as a retryable 503 without the upstream detail.
pub(super) fn map_sync_error(request_id: String, error: &SyncError) -> ApiError {
    match error {
        SyncError::SourceUnavailable(failure) => {
            tracing::warn!(
                zone = %failure.zone_code,
                attempts = failure.attempts,
                error = %failure.message,
                "source unavailable"
            );
            ApiError::new(
                request_id,
                ErrorCode::SourceUnavailable,
                "source unavailable, try again",
            )
        }
        SyncError::BlankZone => ApiError::new(request_id, ErrorCode::BadRequest, error.to_string()),
        SyncError::StateNotFound(_) => {
            ApiError::new(request_id, ErrorCode::NotFound, error.to_string())
        }
        SyncError::Store(e) => {
            tracing::error!(error = %e, "prayer time store failed");
            ApiError::new(request_id, ErrorCode::InternalError, "prayer time store failed")
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/zones", get(zones::list_zones))
        .route("/api/v1/zones/refresh", post(zones::refresh_zones))
        .route("/api/v1/prayer-times", get(prayer_times::today))
        .route(
            "/api/v1/prayer-times/{zone}/history",
            get(prayer_times::history),
        )
        .route(
            "/api/v1/prayer-times/{zone}/refresh",
            post(prayer_times::refresh),
        )
        .route("/api/v1/scrape/all", post(scrape::scrape_all))
        .route("/api/v1/scrape/state/{state}", post(scrape::scrape_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    store: &'static str,
    source: &'static str,
}

/// 200 when the store answers, 503 otherwise. The source is named, not probed.
async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<ApiResponse<Health>>) {
    let source = state.service.source_name();
    let (status, store) = match state.service.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "health: store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (status, ApiResponse::new(req_id.0, Health { store, source }))
}

#[cfg(test)]
#[path = "api_test.rs"]
pub(crate) mod tests;
