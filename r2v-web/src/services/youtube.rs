//! YouTube Data API v3 client
//!
//! Fetches music videos either by search text (search, then a details
//! lookup for durations) or from the regional "most popular" chart, and maps
//! them into [`Track`]s.

use r2v_common::human_time::iso_duration_to_mm_ss;
use r2v_common::model::{Thumbnail, Thumbnails, Track};
use reqwest::Method;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error};

use super::api_client::{ApiClient, ClientError};

/// YouTube category id for Music
const MUSIC_CATEGORY_ID: &str = "10";

/// Options for [`YouTubeClient::fetch_items`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Search text; blank means "trending"
    pub query: Option<String>,
    /// How many candidates to request before picking `count`
    pub max_pool: u32,
    /// How many results to return
    pub count: usize,
    /// Region for the trending chart
    pub region_code: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            query: None,
            max_pool: 25,
            count: 10,
            region_code: "US".to_string(),
        }
    }
}

impl FetchOptions {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Chart options; the pool grows with `count` so large counts are not
    /// cut off at the default pool size
    pub fn trending(region_code: impl Into<String>, count: usize) -> Self {
        let defaults = Self::default();
        Self {
            region_code: region_code.into(),
            max_pool: defaults.max_pool.max(count as u32),
            count,
            ..defaults
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_max_pool(mut self, max_pool: u32) -> Self {
        self.max_pool = max_pool;
        self
    }
}

// ----------------------------------------------------------------------------
// Wire types (only the fields we read)
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<SearchId>,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel_title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnails: Option<WireThumbnails>,
}

#[derive(Debug, Default, Deserialize)]
struct WireThumbnails {
    #[serde(default)]
    default: Option<WireThumbnail>,
    #[serde(default)]
    medium: Option<WireThumbnail>,
    #[serde(default)]
    high: Option<WireThumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct WireThumbnail {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: Option<String>,
}

fn merge_thumbnail(wire: Option<&WireThumbnail>, fallback: Thumbnail) -> Thumbnail {
    match wire {
        None => fallback,
        Some(w) => Thumbnail {
            url: w.url.clone().unwrap_or(fallback.url),
            width: w.width.unwrap_or(fallback.width),
            height: w.height.unwrap_or(fallback.height),
        },
    }
}

fn map_track(video_id: String, snippet: Option<&Snippet>, details: Option<&ContentDetails>) -> Track {
    let empty = Snippet::default();
    let snippet = snippet.unwrap_or(&empty);
    let defaults = Thumbnails::default();
    let wire = snippet.thumbnails.as_ref();

    Track {
        id: video_id.clone(),
        title: snippet
            .title
            .clone()
            .unwrap_or_else(|| "Unknown Title".to_string()),
        artists: vec![snippet
            .channel_title
            .clone()
            .unwrap_or_else(|| "Unknown Artist".to_string())],
        album: String::new(),
        duration: iso_duration_to_mm_ss(details.and_then(|d| d.duration.as_deref())),
        thumbnails: Thumbnails {
            default: merge_thumbnail(wire.and_then(|t| t.default.as_ref()), defaults.default),
            medium: merge_thumbnail(wire.and_then(|t| t.medium.as_ref()), defaults.medium),
            high: merge_thumbnail(wire.and_then(|t| t.high.as_ref()), defaults.high),
        },
        video_id,
        is_explicit: false,
        category: "Music".to_string(),
        description: snippet.description.clone().unwrap_or_default(),
    }
}

/// YouTube Data API client
pub struct YouTubeClient {
    api: ApiClient,
    api_key: Option<String>,
}

impl YouTubeClient {
    /// Create a client against `base_url` (normally
    /// `https://www.googleapis.com/youtube/v3`)
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(base_url)?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch tracks by search text or from the trending chart
    ///
    /// Returns an empty list (after logging) when no API key is configured.
    /// Upstream failures are logged and returned.
    pub async fn fetch_items(&self, options: &FetchOptions) -> Result<Vec<Track>, ClientError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("YouTube API key missing");
            return Ok(Vec::new());
        };

        match options.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => self.search(api_key, query, options).await,
            None => self.trending(api_key, options).await,
        }
    }

    async fn search(
        &self,
        api_key: &str,
        query: &str,
        options: &FetchOptions,
    ) -> Result<Vec<Track>, ClientError> {
        let max_pool = options.max_pool.to_string();
        let request = self.api.third_party(Method::GET, "/search").query(&[
            ("key", api_key),
            ("part", "snippet"),
            ("maxResults", max_pool.as_str()),
            ("q", query),
            ("type", "video"),
            ("videoCategoryId", MUSIC_CATEGORY_ID),
        ]);

        let search: ListResponse<SearchItem> = self.api.send_json(request).await.map_err(|e| {
            error!(query = %query, error = %e, "YouTube search request failed");
            e
        })?;

        let picked: Vec<SearchItem> = search.items.into_iter().take(options.count).collect();
        if picked.is_empty() {
            return Ok(Vec::new());
        }

        let video_ids: Vec<&str> = picked
            .iter()
            .filter_map(|item| item.id.as_ref().and_then(|id| id.video_id.as_deref()))
            .collect();
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = video_ids.join(",");
        let request = self.api.third_party(Method::GET, "/videos").query(&[
            ("key", api_key),
            ("part", "snippet,contentDetails"),
            ("id", ids.as_str()),
        ]);

        let details: ListResponse<VideoItem> = self.api.send_json(request).await.map_err(|e| {
            error!(video_ids_count = video_ids.len(), error = %e, "YouTube details request failed");
            e
        })?;

        let details_by_id: HashMap<String, VideoItem> = details
            .items
            .into_iter()
            .filter_map(|v| v.id.clone().map(|id| (id, v)))
            .collect();

        debug!(query = %query, results = picked.len(), "YouTube search complete");

        Ok(picked
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                let vid = item
                    .id
                    .and_then(|id| id.video_id)
                    .unwrap_or_else(|| idx.to_string());
                let detail = details_by_id.get(&vid);
                let snippet = detail
                    .and_then(|d| d.snippet.as_ref())
                    .or(item.snippet.as_ref());
                map_track(vid.clone(), snippet, detail.and_then(|d| d.content_details.as_ref()))
            })
            .collect())
    }

    async fn trending(&self, api_key: &str, options: &FetchOptions) -> Result<Vec<Track>, ClientError> {
        let max_pool = options.max_pool.to_string();
        let request = self.api.third_party(Method::GET, "/videos").query(&[
            ("key", api_key),
            ("part", "snippet,contentDetails"),
            ("chart", "mostPopular"),
            ("regionCode", options.region_code.as_str()),
            ("videoCategoryId", MUSIC_CATEGORY_ID),
            ("maxResults", max_pool.as_str()),
        ]);

        let trending: ListResponse<VideoItem> = self.api.send_json(request).await.map_err(|e| {
            error!(region_code = %options.region_code, error = %e, "YouTube trending request failed");
            e
        })?;

        debug!(
            region_code = %options.region_code,
            candidates = trending.items.len(),
            "YouTube trending fetched"
        );

        Ok(trending
            .items
            .into_iter()
            .take(options.count)
            .enumerate()
            .map(|(idx, item)| {
                let vid = item.id.clone().unwrap_or_else(|| idx.to_string());
                map_track(vid, item.snippet.as_ref(), item.content_details.as_ref())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trending_pool_covers_count() {
        let small = FetchOptions::trending("US", 12);
        assert_eq!(small.max_pool, 25);
        assert_eq!(small.count, 12);

        let large = FetchOptions::trending("GB", 40);
        assert_eq!(large.max_pool, 40);
        assert_eq!(large.region_code, "GB");
    }

    #[test]
    fn test_map_track_applies_defaults() {
        let track = map_track("xyz".to_string(), None, None);
        assert_eq!(track.title, "Unknown Title");
        assert_eq!(track.artists, vec!["Unknown Artist".to_string()]);
        assert_eq!(track.duration, "0:00");
        assert_eq!(track.thumbnails.high.width, 480);
        assert_eq!(track.category, "Music");
        assert!(!track.is_explicit);
    }

    #[test]
    fn test_map_track_reads_snippet() {
        let item: VideoItem = serde_json::from_value(json!({
            "id": "abc",
            "snippet": {
                "title": "Song",
                "channelTitle": "Artist",
                "description": "desc",
                "thumbnails": {
                    "medium": {"url": "https://i.ytimg.com/m.jpg", "width": 320, "height": 180}
                }
            },
            "contentDetails": {"duration": "PT3M5S"}
        }))
        .unwrap();

        let track = map_track(
            item.id.clone().unwrap(),
            item.snippet.as_ref(),
            item.content_details.as_ref(),
        );
        assert_eq!(track.title, "Song");
        assert_eq!(track.artists, vec!["Artist".to_string()]);
        assert_eq!(track.duration, "3:05");
        assert_eq!(track.thumbnails.medium.url, "https://i.ytimg.com/m.jpg");
        assert_eq!(track.thumbnails.default.url, "");
        assert_eq!(track.description, "desc");
    }

    #[tokio::test]
    async fn test_missing_key_returns_empty() {
        let client = YouTubeClient::new("http://127.0.0.1:9", Some("  ".to_string())).unwrap();
        assert!(!client.has_api_key());

        let items = client.fetch_items(&FetchOptions::default()).await.unwrap();
        assert!(items.is_empty());
    }
}
