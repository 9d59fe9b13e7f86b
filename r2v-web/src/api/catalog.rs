//! Trending, search, library and recommendations
//!
//! Upstream failures never reach the client as errors: the handler logs,
//! records the failure for `/health` and answers with an empty list.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use r2v_common::model::{FeaturedItem, LibraryEntry, Settings, Track};
use r2v_common::regions::format_region_label;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::settings::settings_from_headers;
use crate::services::recommendations::featured_items;
use crate::services::youtube::FetchOptions;
use crate::AppState;

/// Shortest query that triggers a search
pub const MIN_QUERY_CHARS: usize = 2;

pub const SEARCH_HINT: &str = "Type at least 2 characters to search YouTube Music";

const SEARCH_MAX_POOL: u32 = 25;
const SEARCH_COUNT: usize = 12;
const LIBRARY_SIZE: usize = 20;
const LIBRARY_REGION: &str = "US";

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub region: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub region: String,
    pub region_label: String,
    pub items: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub items: Vec<Track>,
    /// Only set for the empty state shown before a search runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LibraryResponse {
    /// Size of the whole library, before filtering
    pub total: usize,
    pub entries: Vec<LibraryEntry>,
}

async fn fetch_or_empty(state: &AppState, options: &FetchOptions) -> Vec<Track> {
    match state.youtube.fetch_items(options).await {
        Ok(items) => items,
        Err(e) => {
            state
                .record_error(format!("YouTube request failed: {}", e))
                .await;
            Vec::new()
        }
    }
}

/// GET /api/trending?region=&count=
///
/// Query parameters win over the settings cookies; invalid values fall
/// back to the cookie, then the default.
pub async fn trending(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TrendingQuery>,
) -> Json<TrendingResponse> {
    let saved = settings_from_headers(&headers);

    let region = query
        .region
        .as_deref()
        .and_then(Settings::normalize_region)
        .unwrap_or(saved.region);
    let count = query
        .count
        .and_then(|c| c.trim().parse::<i64>().ok())
        .filter(|c| Settings::valid_count(*c))
        .map(|c| c as usize)
        .unwrap_or(saved.count as usize);

    debug!(region = %region, count, "Trending requested");

    let items = fetch_or_empty(&state, &FetchOptions::trending(region.clone(), count)).await;

    Json(TrendingResponse {
        region_label: format_region_label(Some(&region)),
        region,
        items,
    })
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let q = query.q.trim().to_string();

    if q.chars().count() < MIN_QUERY_CHARS {
        return Json(SearchResponse {
            query: q,
            items: Vec::new(),
            hint: Some(SEARCH_HINT.to_string()),
        });
    }

    let options = FetchOptions::search(q.clone())
        .with_max_pool(SEARCH_MAX_POOL)
        .with_count(SEARCH_COUNT);
    let items = fetch_or_empty(&state, &options).await;

    debug!(query = %q, results = items.len(), "Search answered");

    Json(SearchResponse {
        query: q,
        items,
        hint: None,
    })
}

/// GET /api/library?q=
///
/// The library is the current US trending list, with entry `i` dated
/// `i + 1` days ago.
pub async fn library(
    State(state): State<AppState>,
    Query(query): Query<LibraryQuery>,
) -> Json<LibraryResponse> {
    let options = FetchOptions::trending(LIBRARY_REGION, LIBRARY_SIZE);
    let tracks = fetch_or_empty(&state, &options).await;

    let now = Utc::now();
    let entries: Vec<LibraryEntry> = tracks
        .into_iter()
        .enumerate()
        .map(|(i, track)| LibraryEntry::new(track, now - Duration::days(i as i64 + 1), now))
        .collect();
    let total = entries.len();

    let needle = query.q.as_deref().map(str::trim).unwrap_or_default();
    let entries = if needle.is_empty() {
        entries
    } else {
        entries
            .into_iter()
            .filter(|e| e.track.matches(needle))
            .collect()
    };

    Json(LibraryResponse { total, entries })
}

/// GET /api/recommendations
pub async fn recommendations() -> Json<Vec<FeaturedItem>> {
    Json(featured_items())
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/trending", get(trending))
        .route("/api/search", get(search))
        .route("/api/library", get(library))
        .route("/api/recommendations", get(recommendations))
}
