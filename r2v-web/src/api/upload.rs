//! Multipart upload endpoint

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use r2v_common::events::R2vEvent;
use serde::Serialize;
use tracing::{info, warn};

use crate::services::uploads::{is_allowed, StoredFile};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying files
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub data: Vec<StoredFile>,
    pub message: String,
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(limit, "Upload rejected: body too large");
        ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size allowed is {}MB",
            limit / (1024 * 1024)
        ))
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// POST /api/upload
///
/// **Request:** `multipart/form-data` with one or more `files` fields
/// **Response:** `{"success": true, "data": [...], "message": "Successfully uploaded N file(s)"}`
///
/// Files with an empty name, empty body or disallowed extension are skipped.
///
/// **Errors:**
/// - 400 Bad Request: nothing was accepted
/// - 413 Payload Too Large: body over the configured limit
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let limit = state.config.max_upload_bytes;
    let mut stored = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        if original.is_empty() {
            warn!("Skipping upload part without a filename");
            continue;
        }
        if !is_allowed(&original) {
            warn!(filename = %original, "File type not allowed");
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if bytes.is_empty() {
            warn!(filename = %original, "Skipping empty upload");
            continue;
        }

        stored.push(state.uploads.save(&original, &bytes).await?);
    }

    if stored.is_empty() {
        return Err(ApiError::BadRequest(
            "No valid files were uploaded. Please check file types and try again.".to_string(),
        ));
    }

    info!(count = stored.len(), "Upload complete");

    state.event_bus.emit_lossy(R2vEvent::FilesUploaded {
        filenames: stored.iter().map(|f| f.filename.clone()).collect(),
        timestamp: Utc::now(),
    });

    Ok(Json(UploadResponse {
        success: true,
        message: format!("Successfully uploaded {} file(s)", stored.len()),
        data: stored,
    }))
}

/// Build upload routes with a `limit`-byte body cap
pub fn upload_routes(limit: usize) -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_files))
        .layer(DefaultBodyLimit::max(limit))
}
