use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::category::{validate_filename, Category};

/// Multipart field that carries the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
}

/// POST /api/upload/resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    handle_upload(&state, Category::Resume, multipart)
        .await
        .map(Json)
}

/// POST /api/upload/video
pub async fn handle_upload_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    handle_upload(&state, Category::Video, multipart)
        .await
        .map(Json)
}

/// Validates and stores the first `file` part of a multipart body.
///
/// Checks run in order and short-circuit: field present, filename non-empty,
/// extension allowed. Nothing touches the disk until all three pass.
pub async fn handle_upload(
    state: &AppState,
    category: Category,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse, AppError> {
    // A body that is not multipart at all simply has no file in it.
    let mut multipart = multipart.map_err(|e| {
        debug!("Multipart extraction rejected: {e}");
        AppError::MissingFile
    })?;

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Plain form values named `file` carry no filename and are not uploads.
        let Some(original) = field.file_name().map(str::to_owned) else {
            continue;
        };
        return store_field(state, category, &original, field).await;
    }

    Err(AppError::MissingFile)
}

async fn store_field(
    state: &AppState,
    category: Category,
    original: &str,
    mut field: Field<'_>,
) -> Result<UploadResponse, AppError> {
    let descriptor = category.descriptor();
    validate_filename(descriptor, original)?;

    let stored_name = state.namer.stored_name(original);
    let mut staged = state.store.stage(category, &stored_name).await?;

    while let Some(chunk) = field.chunk().await.map_err(map_multipart_error)? {
        staged.write_chunk(&chunk).await?;
    }
    let bytes = staged.bytes_written();
    staged.commit().await?;

    info!(
        category = descriptor.name,
        original = %original,
        stored = %stored_name,
        bytes,
        "Upload accepted"
    );

    Ok(UploadResponse {
        success: true,
        message: descriptor.success_message.to_string(),
        filename: stored_name,
    })
}

fn map_multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::MalformedUpload(e.body_text())
    }
}
