//! Shared data model
//!
//! Tracks are sourced transiently from the video-metadata API and never
//! persisted. Indexing tasks are synthetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single thumbnail rendition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    fn placeholder(width: u32, height: u32) -> Self {
        Self {
            url: String::new(),
            width,
            height,
        }
    }
}

/// The three thumbnail sizes the API publishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    pub default: Thumbnail,
    pub medium: Thumbnail,
    pub high: Thumbnail,
}

impl Default for Thumbnails {
    /// Empty URLs at the API's nominal sizes (120x90, 320x180, 480x360)
    fn default() -> Self {
        Self {
            default: Thumbnail::placeholder(120, 90),
            medium: Thumbnail::placeholder(320, 180),
            high: Thumbnail::placeholder(480, 360),
        }
    }
}

/// A track (music video) as shown in trending, search and library views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    /// Display duration, `m:ss`
    pub duration: String,
    pub thumbnails: Thumbnails,
    pub video_id: String,
    pub is_explicit: bool,
    pub category: String,
    pub description: String,
}

impl Track {
    /// Canonical watch URL for this track
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Case-insensitive match against title, artists or album
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.artists.join(" ").to_lowercase().contains(&needle)
            || self.album.to_lowercase().contains(&needle)
    }
}

/// Curated recommendation card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedItem {
    pub title: String,
    /// Performing artist(s)
    pub category: String,
    pub description: String,
    pub link: String,
}

/// Library view row: a track and when it was (notionally) added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    #[serde(flatten)]
    pub track: Track,
    pub added_date: DateTime<Utc>,
    /// Relative label, e.g. `3 days ago`
    pub added_label: String,
}

impl LibraryEntry {
    pub fn new(track: Track, added_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            added_label: crate::human_time::relative_day_label(added_date, now),
            track,
            added_date,
        }
    }
}

/// Trending display preferences (cookie-backed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Two-letter region code, upper-case
    pub region: String,
    /// Items per trending page, 1 to [`Settings::MAX_COUNT`]
    pub count: u32,
}

impl Settings {
    pub const DEFAULT_REGION: &'static str = "US";
    pub const DEFAULT_COUNT: u32 = 12;
    pub const MAX_COUNT: u32 = 50;

    /// Accepts exactly two characters; returns the upper-cased code
    pub fn normalize_region(raw: &str) -> Option<String> {
        (raw.chars().count() == 2 && !raw.contains(char::is_whitespace))
            .then(|| raw.to_uppercase())
    }

    /// Whether `count` is within `1..=MAX_COUNT`
    pub fn valid_count(count: i64) -> bool {
        (1..=Self::MAX_COUNT as i64).contains(&count)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: Self::DEFAULT_REGION.to_string(),
            count: Self::DEFAULT_COUNT,
        }
    }
}

/// Mock indexing task status
///
/// Progresses `Downloading -> Vectorizing -> Inserting -> Completed`;
/// `Failed` is terminal and reachable only from the initial snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Downloading,
    Vectorizing,
    Inserting,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Whether the status can no longer change
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Next status in the pipeline; terminal statuses map to themselves
    pub fn next(self) -> Self {
        match self {
            TaskStatus::Downloading => TaskStatus::Vectorizing,
            TaskStatus::Vectorizing => TaskStatus::Inserting,
            TaskStatus::Inserting => TaskStatus::Completed,
            other => other,
        }
    }

    /// Ordinal for ordering checks (failed ranks with completed)
    pub fn rank(self) -> u8 {
        match self {
            TaskStatus::Downloading => 0,
            TaskStatus::Vectorizing => 1,
            TaskStatus::Inserting => 2,
            TaskStatus::Completed | TaskStatus::Failed => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Downloading => "downloading",
            TaskStatus::Vectorizing => "vectorizing",
            TaskStatus::Inserting => "inserting",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

/// Mock indexing task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingTask {
    pub id: String,
    pub filename: String,
    pub status: TaskStatus,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
