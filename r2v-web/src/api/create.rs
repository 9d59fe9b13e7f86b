//! Create wizard endpoints
//!
//! Thin HTTP layer over [`crate::create::SessionStore`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use r2v_common::events::R2vEvent;
use r2v_common::model::FeaturedItem;
use serde::Deserialize;
use tracing::info;

use crate::create::{CreateSession, DownloadDescriptor, Step};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AddFilesRequest {
    /// Stored upload filenames
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectTrackRequest {
    /// Index into the session's items; `null` clears the selection
    pub index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SetWindowRequest {
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
pub struct SetStepRequest {
    pub step: Step,
}

fn step_changed(state: &AppState, session_id: &str, step: Step) {
    state.event_bus.emit_lossy(R2vEvent::CreateStepChanged {
        session_id: session_id.to_string(),
        step: step.as_str().to_string(),
        timestamp: Utc::now(),
    });
}

/// POST /api/create/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSession>) {
    (StatusCode::CREATED, Json(state.sessions.create().await))
}

/// GET /api/create/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CreateSession>> {
    Ok(Json(state.sessions.get(&id).await?))
}

/// DELETE /api/create/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.sessions.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/create/sessions/:id/files
///
/// **Request:** `{"files": ["<stored filename>", ...]}`
///
/// Every name must refer to a file accepted by `/api/upload`.
pub async fn add_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddFilesRequest>,
) -> ApiResult<Json<CreateSession>> {
    if req.files.is_empty() {
        return Err(ApiError::BadRequest("files must not be empty".to_string()));
    }
    for name in &req.files {
        if state.uploads.path_of(name).await.is_none() {
            return Err(ApiError::BadRequest(format!("Unknown upload: {}", name)));
        }
    }

    let session = state
        .sessions
        .update(&id, |s| {
            s.add_files(req.files);
            Ok(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// DELETE /api/create/sessions/:id/files
pub async fn clear_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CreateSession>> {
    let session = state
        .sessions
        .update(&id, |s| {
            s.clear_files();
            Ok(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// DELETE /api/create/sessions/:id/files/:index
pub async fn remove_file(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> ApiResult<Json<CreateSession>> {
    let session = state
        .sessions
        .update(&id, |s| {
            s.remove_file(index)?;
            Ok(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// PUT /api/create/sessions/:id/track
pub async fn select_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectTrackRequest>,
) -> ApiResult<Json<CreateSession>> {
    let session = state
        .sessions
        .update(&id, |s| {
            s.select_track(req.index)?;
            Ok(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// PUT /api/create/sessions/:id/window
pub async fn set_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetWindowRequest>,
) -> ApiResult<Json<CreateSession>> {
    let session = state
        .sessions
        .update(&id, |s| {
            s.set_window(req.start, req.duration)?;
            Ok(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// PUT /api/create/sessions/:id/step
///
/// **Errors:**
/// - 409 Conflict: `edit` without files, `download` without a track and
///   window
pub async fn set_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStepRequest>,
) -> ApiResult<Json<CreateSession>> {
    let (old, session) = state
        .sessions
        .update(&id, |s| {
            let old = s.set_step(req.step)?;
            Ok((old, s.clone()))
        })
        .await?;

    if old != session.step {
        info!(session_id = %id, from = old.as_str(), to = session.step.as_str(), "Create step changed");
        step_changed(&state, &id, session.step);
    }
    Ok(Json(session))
}

/// POST /api/create/sessions/:id/recommendations
pub async fn load_recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<FeaturedItem>>> {
    Ok(Json(state.sessions.load_recommendations(&id).await?))
}

/// POST /api/create/sessions/:id/download
///
/// Moves the session to the download step and describes the output.
pub async fn finalize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DownloadDescriptor>> {
    let (old, descriptor) = state
        .sessions
        .update(&id, |s| {
            let old = s.step;
            Ok((old, s.finalize()?))
        })
        .await?;

    info!(
        session_id = %id,
        processing_id = %descriptor.processing_id,
        download_name = %descriptor.download_name,
        "Create session finalized"
    );
    if old != Step::Download {
        step_changed(&state, &id, Step::Download);
    }
    Ok(Json(descriptor))
}

/// Build create wizard routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/create/sessions", post(create_session))
        .route(
            "/api/create/sessions/:id",
            get(get_session).delete(delete_session),
        )
        .route(
            "/api/create/sessions/:id/files",
            post(add_files).delete(clear_files),
        )
        .route("/api/create/sessions/:id/files/:index", delete(remove_file))
        .route("/api/create/sessions/:id/track", put(select_track))
        .route("/api/create/sessions/:id/window", put(set_window))
        .route("/api/create/sessions/:id/step", put(set_step))
        .route(
            "/api/create/sessions/:id/recommendations",
            post(load_recommendations),
        )
        .route("/api/create/sessions/:id/download", post(finalize))
}
