//! Axum REST API handlers

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
    extract::{State, DefaultBodyLimit, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tower_http::services::ServeDir;
use tracing::error;

use crate::service::CoverService;
use crate::storage::{ObjectStore, RecordStore};

use super::dto::*;

const FAILURE_MESSAGE: &str = "Failed to process image";

/// Application state shared across handlers
pub struct AppState<O: ObjectStore, R: RecordStore> {
    pub service: Arc<CoverService<O, R>>,
    pub start_time: Instant,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the REST API router.
///
/// `public_mount` exposes a local object store directory, e.g. `("/storage", root)`.
pub fn create_rest_router<O: ObjectStore, R: RecordStore>(
    state: Arc<AppState<O, R>>,
    public_mount: Option<(&str, &Path)>,
) -> Router {
    // Base64 inflates payloads by 4/3; leave headroom for the JSON envelope
    let body_limit = state.service.max_input_bytes() / 3 * 4 + 64 * 1024;

    let mut router = Router::new()
        .route("/api", post(normalize_handler::<O, R>))
        .route("/api/v1/covers", post(normalize_handler::<O, R>))
        .route("/health", get(health_handler::<O, R>))
        .route("/api/v1/health", get(health_handler::<O, R>));

    if let Some((mount_path, root)) = public_mount {
        router = router.nest_service(mount_path, ServeDir::new(root));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn bad_request(details: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(FAILURE_MESSAGE, details)))
}

/// Normalize an uploaded cover image and store it for the given record
async fn normalize_handler<O: ObjectStore, R: RecordStore>(
    State(state): State<Arc<AppState<O, R>>>,
    payload: Result<Json<NormalizeRequest>, JsonRejection>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_request(&e.body_text()))?;

    if request.image_data.trim().is_empty() {
        return Err(bad_request("Missing imageData field"));
    }
    if request.identifier.trim().is_empty() {
        return Err(bad_request("Missing identifier field"));
    }

    let result = state
        .service
        .normalize(&request.image_data, &request.identifier)
        .await
        .map_err(|e| {
            error!("Error processing image for {}: {}", request.identifier, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(FAILURE_MESSAGE, &e.to_string())),
            )
        })?;

    Ok(Json(NormalizeResponse {
        success: true,
        url: result.url,
        message: "Image processed and saved successfully".to_string(),
    }))
}

/// Health check
async fn health_handler<O: ObjectStore, R: RecordStore>(
    State(state): State<Arc<AppState<O, R>>>,
) -> Json<HealthResponse> {
    let health = state.service.health();

    Json(HealthResponse {
        healthy: health.healthy,
        version: health.version,
        format: health.format,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
