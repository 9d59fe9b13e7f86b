//! Test Helper Utilities
//!
//! Shared utilities for testing r2v-web: a local stand-in for the YouTube,
//! GitHub and backend APIs, app construction, and body helpers.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Multipart, Path, Query},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use r2v_common::config::TomlConfig;
use r2v_web::create::SessionStore;
use r2v_web::{build_router, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path as FsPath;
use std::time::Duration;

pub const README_MARKDOWN: &str = "# Reels2Vec\n\nHello **world**\n\n<script>alert(1)</script>\n";

/// Number of items the fake trending chart holds (the API's page maximum)
pub const FAKE_CHART_SIZE: usize = 50;

fn trending_item(i: usize) -> Value {
    json!({
        "id": format!("t{}", i),
        "snippet": {
            "title": format!("Trending {}", i),
            "channelTitle": format!("Artist {}", i),
            "description": "",
            "thumbnails": {
                "high": {"url": format!("https://i.ytimg.com/t{}.jpg", i), "width": 480, "height": 360}
            }
        },
        "contentDetails": {"duration": format!("PT3M{}S", i)}
    })
}

async fn fake_search(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("key").map(String::as_str) != Some("test-key") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "API key not valid"}})),
        )
            .into_response();
    }
    if params.get("q").map(String::as_str) == Some("explode") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"code": 500, "message": "Backend Error"}})),
        )
            .into_response();
    }

    let max: usize = params
        .get("maxResults")
        .and_then(|m| m.parse().ok())
        .unwrap_or(5);
    let q = params.get("q").cloned().unwrap_or_default();
    let items: Vec<Value> = (0..max.min(20))
        .map(|i| {
            json!({
                "id": {"kind": "youtube#video", "videoId": format!("s{}", i)},
                "snippet": {"title": format!("{} result {}", q, i), "channelTitle": "Search Channel"}
            })
        })
        .collect();

    Json(json!({ "items": items })).into_response()
}

async fn fake_videos(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("chart").map(String::as_str) == Some("mostPopular") {
        if params.get("regionCode").map(String::as_str) == Some("ZZ") {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": {"code": 503, "message": "Chart unavailable"}})),
            )
                .into_response();
        }
        let max: usize = params
            .get("maxResults")
            .and_then(|m| m.parse().ok())
            .unwrap_or(5);
        let items: Vec<Value> = (0..max.min(FAKE_CHART_SIZE)).map(trending_item).collect();
        return Json(json!({ "items": items })).into_response();
    }

    // Details lookup; the last id is left out so the search snippet fallback
    // is exercised
    let ids: Vec<&str> = params
        .get("id")
        .map(|ids| ids.split(',').collect())
        .unwrap_or_default();
    let keep = ids.len().saturating_sub(1);
    let items: Vec<Value> = ids
        .iter()
        .take(keep)
        .map(|id| {
            json!({
                "id": id,
                "snippet": {"title": format!("Detail {}", id), "channelTitle": "Detail Channel"},
                "contentDetails": {"duration": "PT4M5S"}
            })
        })
        .collect();
    Json(json!({ "items": items })).into_response()
}

async fn fake_readme(Path((owner, repo)): Path<(String, String)>) -> Response {
    if owner == "acme" && repo == "reels" {
        let encoded = STANDARD.encode(README_MARKDOWN);
        // GitHub wraps the payload
        let wrapped: Vec<String> = encoded
            .as_bytes()
            .chunks(20)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        Json(json!({"encoding": "base64", "content": wrapped.join("\n")})).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
    }
}

fn auth_of(headers: &HeaderMap) -> Value {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| Value::String(v.to_string()))
        .unwrap_or(Value::Null)
}

async fn echo_get(headers: HeaderMap) -> Json<Value> {
    Json(json!({"method": "GET", "auth": auth_of(&headers)}))
}

async fn echo_post(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"method": "POST", "auth": auth_of(&headers), "body": body}))
}

async fn echo_put(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"method": "PUT", "body": body}))
}

async fn echo_patch(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"method": "PATCH", "body": body}))
}

async fn echo_delete() -> Json<Value> {
    Json(json!({"method": "DELETE"}))
}

async fn validation_failure() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"message": "Validation failed", "field": "name"})),
    )
        .into_response()
}

async fn plain_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(10)).await;
    "late"
}

async fn count_parts(mut multipart: Multipart) -> Json<Value> {
    let mut names = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        names.push(field.file_name().unwrap_or_default().to_string());
    }
    Json(json!({ "files": names }))
}

/// Start the fake upstream on an ephemeral port; returns its base URL
///
/// - YouTube under `/youtube/v3`
/// - GitHub under `/github`
/// - backend under `/backend` (`/backend/health` answers 200)
pub async fn spawn_fake_upstream() -> String {
    let app = Router::new()
        .route("/youtube/v3/search", get(fake_search))
        .route("/youtube/v3/videos", get(fake_videos))
        .route("/github/repos/:owner/:repo/readme", get(fake_readme))
        .route("/backend/health", get(|| async { Json(json!({"ok": true})) }))
        .route(
            "/backend/echo",
            get(echo_get)
                .post(echo_post)
                .put(echo_put)
                .patch(echo_patch)
                .delete(echo_delete),
        )
        .route("/backend/fail", get(validation_failure))
        .route("/backend/plain-fail", get(plain_failure))
        .route("/backend/slow", get(slow))
        .route("/backend/upload", post(count_parts));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake upstream");
    });

    format!("http://{}", addr)
}

/// Config pointing every outbound client at `upstream`
pub fn test_config(upstream: &str, upload_dir: &FsPath) -> TomlConfig {
    TomlConfig {
        youtube_api_key: Some("test-key".to_string()),
        youtube_api_base: format!("{}/youtube/v3", upstream),
        github_repo: Some("https://github.com/acme/reels".to_string()),
        github_api_base: format!("{}/github", upstream),
        backend_base_url: format!("{}/backend", upstream),
        upload_dir: Some(upload_dir.to_path_buf()),
        task_tick_ms: 50,
        ..TomlConfig::default()
    }
}

/// App state with a near-instant recommendations delay
pub fn test_state(config: TomlConfig) -> AppState {
    AppState::new(config)
        .expect("build state")
        .with_sessions(SessionStore::with_recommendations_delay(Duration::from_millis(5)))
}

pub fn setup_app(config: TomlConfig) -> Router {
    build_router(test_state(config))
}

/// Test helper: Create request with an empty body
pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Create request with a JSON body
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
