//! Snippet selector endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use r2v_common::events::R2vEvent;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::snippet::waveform::{self, Column, MAX_WIDTH};
use crate::snippet::{extract_video_id, validate_range, SnippetSubmission, SnippetWindow};
use crate::{ApiError, ApiResult, AppState};

const DEFAULT_WAVEFORM_WIDTH: u32 = 800;
const DEFAULT_WAVEFORM_HEIGHT: f64 = 150.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTimestampsRequest {
    pub audio_url: String,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTimestampsResponse {
    pub ok: bool,
    pub id: String,
    pub video_id: String,
}

/// POST /api/audio-timestamps
///
/// **Request:** `{"audioUrl": "https://youtu.be/...", "startTime": 12.0, "endTime": 42.0}`
/// **Response:** 201 `{"ok": true, "id": "...", "videoId": "..."}`
///
/// **Errors:**
/// - 400 Bad Request: bad range or unrecognised video URL
pub async fn submit_timestamps(
    State(state): State<AppState>,
    Json(req): Json<SubmitTimestampsRequest>,
) -> ApiResult<(StatusCode, Json<SubmitTimestampsResponse>)> {
    validate_range(req.start_time, req.end_time).map_err(ApiError::BadRequest)?;

    let video_id = extract_video_id(&req.audio_url)
        .ok_or_else(|| ApiError::BadRequest("Invalid or unsupported video URL".to_string()))?;

    let submission = SnippetSubmission {
        id: Uuid::new_v4().to_string(),
        audio_url: req.audio_url,
        video_id: video_id.clone(),
        start_time: req.start_time,
        end_time: req.end_time,
        created_at: Utc::now(),
    };

    info!(
        submission_id = %submission.id,
        video_id = %video_id,
        start = submission.start_time,
        end = submission.end_time,
        "Snippet window submitted"
    );

    state.event_bus.emit_lossy(R2vEvent::SnippetSubmitted {
        submission_id: submission.id.clone(),
        video_id: video_id.clone(),
        start_time: submission.start_time,
        end_time: submission.end_time,
        timestamp: submission.created_at,
    });

    let id = submission.id.clone();
    state.submissions.write().await.push(submission);

    Ok((
        StatusCode::CREATED,
        Json(SubmitTimestampsResponse {
            ok: true,
            id,
            video_id,
        }),
    ))
}

/// GET /api/audio-timestamps
pub async fn list_timestamps(State(state): State<AppState>) -> Json<Vec<SnippetSubmission>> {
    Json(state.submissions.read().await.to_vec())
}

#[derive(Debug, Deserialize)]
pub struct WaveformQuery {
    pub duration: f64,
    pub width: Option<u32>,
    pub height: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct WaveformResponse {
    pub duration: f64,
    pub width: u32,
    pub height: f64,
    pub columns: Vec<Column>,
}

/// GET /api/waveform?duration=&width=&height=
///
/// Synthetic, decorative waveform columns (width defaults to 800, height
/// to 150).
pub async fn get_waveform(Query(query): Query<WaveformQuery>) -> ApiResult<Json<WaveformResponse>> {
    if !query.duration.is_finite() || query.duration <= 0.0 {
        return Err(ApiError::BadRequest("duration must be positive".to_string()));
    }

    let width = query.width.unwrap_or(DEFAULT_WAVEFORM_WIDTH);
    if width == 0 || width > MAX_WIDTH {
        return Err(ApiError::BadRequest(format!(
            "width must be between 1 and {}",
            MAX_WIDTH
        )));
    }

    let height = query.height.unwrap_or(DEFAULT_WAVEFORM_HEIGHT);
    if !height.is_finite() || height <= 0.0 {
        return Err(ApiError::BadRequest("height must be positive".to_string()));
    }

    let mut rng = rand::thread_rng();
    let columns = waveform::columns(query.duration, width, height, &mut rng);

    Ok(Json(WaveformResponse {
        duration: query.duration,
        width,
        height,
        columns,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRequest {
    pub duration: f64,
    pub click_x: f64,
    pub width: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResponse {
    pub start: f64,
    pub end: f64,
    pub seek_to: f64,
}

/// POST /api/snippet/window
///
/// Resolves a click on a `width`-pixel waveform into the centred window
/// and the position to seek to.
pub async fn resolve_window(Json(req): Json<WindowRequest>) -> ApiResult<Json<WindowResponse>> {
    let mut window = SnippetWindow::new(req.duration);
    let seek_to = window.select_at(req.click_x, req.width).ok_or_else(|| {
        ApiError::BadRequest("duration and width must be positive".to_string())
    })?;

    Ok(Json(WindowResponse {
        start: window.start(),
        end: window.end(),
        seek_to,
    }))
}

pub fn snippet_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/audio-timestamps",
            post(submit_timestamps).get(list_timestamps),
        )
        .route("/api/waveform", get(get_waveform))
        .route("/api/snippet/window", post(resolve_window))
}
