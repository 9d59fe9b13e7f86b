//! Audio snippet selection
//!
//! Pure model of the 30-second window selector: window geometry, the
//! playback polling state machine, and the decorative waveform. Clients
//! draw and drive a player from these outputs.

pub mod monitor;
pub mod waveform;
pub mod window;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

pub use monitor::{PlaybackMonitor, PlayerCommand};
pub use window::{Overlay, SnippetWindow};

/// Length of the selectable window
pub const WINDOW_SECONDS: f64 = 30.0;

/// How often the client polls the player position
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Consecutive non-advancing playing polls tolerated before recovery
pub const STUCK_THRESHOLD: u32 = 20;

/// Movement below this (seconds) counts as not advancing
pub const STUCK_TOLERANCE: f64 = 0.01;

/// How far past a stuck position recovery seeks
pub const RECOVERY_NUDGE: f64 = 0.1;

static VIDEO_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
        .expect("valid regex")
});

/// A submitted window, kept in memory
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSubmission {
    pub id: String,
    pub audio_url: String,
    pub video_id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub created_at: DateTime<Utc>,
}

/// Submissions kept in memory before the oldest are dropped
pub const MAX_SUBMISSIONS: usize = 200;

/// Bounded log of submitted windows, oldest first
#[derive(Debug, Clone)]
pub struct SubmissionLog {
    entries: VecDeque<SnippetSubmission>,
    capacity: usize,
}

impl Default for SubmissionLog {
    fn default() -> Self {
        Self::with_capacity(MAX_SUBMISSIONS)
    }
}

impl SubmissionLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(MAX_SUBMISSIONS)),
            capacity: capacity.max(1),
        }
    }

    /// Append `submission`, evicting the oldest entries past capacity
    pub fn push(&mut self, submission: SnippetSubmission) {
        self.entries.push_back(submission);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<SnippetSubmission> {
        self.entries.iter().cloned().collect()
    }
}

/// Check a submitted `[start, end]` range
///
/// Requires `0 <= start < end` and a span of at most [`WINDOW_SECONDS`]
/// (plus a millisecond for float noise from the client).
pub fn validate_range(start: f64, end: f64) -> Result<(), String> {
    if !start.is_finite() || !end.is_finite() {
        return Err("startTime and endTime must be numbers".to_string());
    }
    if start < 0.0 {
        return Err("startTime must not be negative".to_string());
    }
    if end <= start {
        return Err("endTime must be after startTime".to_string());
    }
    if end - start > WINDOW_SECONDS + 0.001 {
        return Err(format!("Window must not exceed {} seconds", WINDOW_SECONDS));
    }
    Ok(())
}

/// Video id from a watch, short or embed URL
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_forms() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(0.0, 30.0).is_ok());
        assert!(validate_range(10.5, 40.5005).is_ok());
        assert!(validate_range(10.0, 10.0).is_err());
        assert!(validate_range(-1.0, 20.0).is_err());
        assert!(validate_range(0.0, 31.0).is_err());
        assert!(validate_range(f64::NAN, 1.0).is_err());
    }

    fn submission(id: &str) -> SnippetSubmission {
        SnippetSubmission {
            id: id.to_string(),
            audio_url: "https://youtu.be/abc".to_string(),
            video_id: "abc".to_string(),
            start_time: 0.0,
            end_time: 30.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_submission_log_drops_oldest() {
        let mut log = SubmissionLog::with_capacity(3);
        assert!(log.is_empty());

        for id in ["a", "b", "c", "d", "e"] {
            log.push(submission(id));
        }

        assert_eq!(log.len(), 3);
        let ids: Vec<String> = log.to_vec().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["c", "d", "e"]);
    }

    #[test]
    fn test_submission_log_default_capacity() {
        let mut log = SubmissionLog::default();
        for i in 0..MAX_SUBMISSIONS + 10 {
            log.push(submission(&i.to_string()));
        }
        assert_eq!(log.len(), MAX_SUBMISSIONS);
        assert_eq!(log.to_vec()[0].id, "10");
    }
}
