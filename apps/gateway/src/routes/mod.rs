pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::assets::{asset_router, handle_not_found};
use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::handlers;

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(asset_router())
        .route("/api/upload/resume", post(handlers::handle_upload_resume))
        .route("/api/upload/video", post(handlers::handle_upload_video))
        .fallback(handle_not_found)
        // Oversized bodies are turned away with 413 before any handler runs.
        // The tower-http limit replaces axum's 2 MiB extractor default.
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::map_response(payload_too_large_as_json))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// The body-limit layer answers 413 in plain text; give it the JSON error shape.
async fn payload_too_large_as_json(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return AppError::PayloadTooLarge.into_response();
    }
    response
}
