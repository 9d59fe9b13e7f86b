//! Create wizard sessions
//!
//! Server-side state for the upload → edit → download flow. Sessions live
//! in memory only and are keyed by a random id.

use chrono::{DateTime, Utc};
use r2v_common::model::FeaturedItem;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::recommendations::featured_items;
use crate::snippet::SnippetWindow;

/// Simulated latency of the recommendations lookup
pub const RECOMMENDATIONS_DELAY: Duration = Duration::from_millis(800);

/// Wizard step (the three tabs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Upload,
    Edit,
    Download,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Upload => "upload",
            Step::Edit => "edit",
            Step::Download => "download",
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("File index {index} out of range ({len} files)")]
    FileIndexOutOfRange { index: usize, len: usize },

    #[error("Track index {index} out of range ({len} items)")]
    TrackIndexOutOfRange { index: usize, len: usize },

    #[error("Cannot enter {step} step: {reason}")]
    StepBlocked { step: &'static str, reason: &'static str },

    #[error("Invalid snippet window: {0}")]
    InvalidWindow(String),
}

/// What the download step hands back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadDescriptor {
    pub processing_id: String,
    pub file: Option<String>,
    pub track: FeaturedItem,
    pub start_time: f64,
    pub end_time: f64,
    pub download_name: String,
}

/// `{title}.mp3`, or `track.mp3` for an untitled track
pub fn download_name(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        "track.mp3".to_string()
    } else {
        format!("{}.mp3", title)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSession {
    pub id: String,
    pub step: Step,
    /// Stored upload filenames
    pub files: Vec<String>,
    pub items: Vec<FeaturedItem>,
    pub selected_track: Option<FeaturedItem>,
    pub window: Option<SnippetWindow>,
    pub processing_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CreateSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            step: Step::Upload,
            files: Vec::new(),
            items: Vec::new(),
            selected_track: None,
            window: None,
            processing_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = String>) {
        self.files.extend(files);
    }

    /// Remove the file at `index`, returning its name
    pub fn remove_file(&mut self, index: usize) -> Result<String, CreateError> {
        if index >= self.files.len() {
            return Err(CreateError::FileIndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        Ok(self.files.remove(index))
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    /// Select `items[index]`, or clear the selection with `None`
    pub fn select_track(&mut self, index: Option<usize>) -> Result<(), CreateError> {
        self.selected_track = match index {
            None => None,
            Some(i) => Some(self.items.get(i).cloned().ok_or(
                CreateError::TrackIndexOutOfRange {
                    index: i,
                    len: self.items.len(),
                },
            )?),
        };
        Ok(())
    }

    /// Set the snippet window for a track of `duration` seconds
    ///
    /// `start` is clamped into the track; a non-positive duration or a
    /// negative start is rejected.
    pub fn set_window(&mut self, start: f64, duration: f64) -> Result<SnippetWindow, CreateError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CreateError::InvalidWindow(format!(
                "duration must be positive, got {}",
                duration
            )));
        }
        if !start.is_finite() || start < 0.0 {
            return Err(CreateError::InvalidWindow(format!(
                "start must be non-negative, got {}",
                start
            )));
        }

        let mut window = SnippetWindow::new(duration);
        window.set_start(start);
        self.window = Some(window);
        Ok(window)
    }

    /// Move to `step`, enforcing its prerequisites; returns the old step
    pub fn set_step(&mut self, step: Step) -> Result<Step, CreateError> {
        match step {
            Step::Upload => {}
            Step::Edit if self.files.is_empty() => {
                return Err(CreateError::StepBlocked {
                    step: step.as_str(),
                    reason: "no files uploaded",
                })
            }
            Step::Edit => {}
            Step::Download => {
                self.check_download_ready()?;
            }
        }

        let old = self.step;
        self.step = step;
        Ok(old)
    }

    fn check_download_ready(&self) -> Result<(&FeaturedItem, &SnippetWindow), CreateError> {
        let track = self.selected_track.as_ref().ok_or(CreateError::StepBlocked {
            step: Step::Download.as_str(),
            reason: "no track selected",
        })?;
        let window = self.window.as_ref().ok_or(CreateError::StepBlocked {
            step: Step::Download.as_str(),
            reason: "no snippet window set",
        })?;
        Ok((track, window))
    }

    /// Assign a processing id and describe the download
    pub fn finalize(&mut self) -> Result<DownloadDescriptor, CreateError> {
        let (track, window) = self.check_download_ready()?;
        let track = track.clone();
        let (start_time, end_time) = (window.start(), window.end());

        let processing_id = self
            .processing_id
            .get_or_insert_with(|| Uuid::new_v4().simple().to_string())
            .clone();
        self.step = Step::Download;

        Ok(DownloadDescriptor {
            processing_id,
            file: self.files.first().cloned(),
            download_name: download_name(&track.title),
            track,
            start_time,
            end_time,
        })
    }
}

/// In-memory session map
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, CreateSession>>>,
    recommendations_delay: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_recommendations_delay(RECOMMENDATIONS_DELAY)
    }

    pub fn with_recommendations_delay(delay: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            recommendations_delay: delay,
        }
    }

    pub async fn create(&self) -> CreateSession {
        let session = CreateSession::new();
        info!(session_id = %session.id, "Create session started");
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        session
    }

    pub async fn get(&self, id: &str) -> Result<CreateSession, CreateError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| CreateError::SessionNotFound(id.to_string()))
    }

    pub async fn remove(&self, id: &str) -> Result<(), CreateError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| debug!(session_id = %id, "Create session removed"))
            .ok_or_else(|| CreateError::SessionNotFound(id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Run `f` against session `id` under the write lock
    pub async fn update<T, F>(&self, id: &str, f: F) -> Result<T, CreateError>
    where
        F: FnOnce(&mut CreateSession) -> Result<T, CreateError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| CreateError::SessionNotFound(id.to_string()))?;
        f(session)
    }

    /// Fill the session's items with the featured list after the simulated
    /// lookup delay
    pub async fn load_recommendations(&self, id: &str) -> Result<Vec<FeaturedItem>, CreateError> {
        // Fail fast before waiting
        self.get(id).await?;
        tokio::time::sleep(self.recommendations_delay).await;

        let items = featured_items();
        self.update(id, |session| {
            session.items = items.clone();
            Ok(())
        })
        .await?;
        debug!(session_id = %id, count = items.len(), "Recommendations loaded");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_session() -> CreateSession {
        let mut s = CreateSession::new();
        s.add_files(vec!["a.mp4".to_string()]);
        s.items = featured_items();
        s.select_track(Some(1)).unwrap();
        s.set_window(40.0, 200.0).unwrap();
        s
    }

    #[test]
    fn test_files_add_remove_clear() {
        let mut s = CreateSession::new();
        s.add_files(vec!["a.mp4".to_string(), "b.mp4".to_string()]);
        s.add_files(vec!["c.mp3".to_string()]);
        assert_eq!(s.files, vec!["a.mp4", "b.mp4", "c.mp3"]);

        assert_eq!(s.remove_file(1).unwrap(), "b.mp4");
        assert_eq!(s.files, vec!["a.mp4", "c.mp3"]);
        assert!(matches!(
            s.remove_file(5),
            Err(CreateError::FileIndexOutOfRange { index: 5, len: 2 })
        ));

        s.clear_files();
        assert!(s.files.is_empty());
    }

    #[test]
    fn test_step_guards() {
        let mut s = CreateSession::new();
        assert!(matches!(
            s.set_step(Step::Edit),
            Err(CreateError::StepBlocked { step: "edit", .. })
        ));

        s.add_files(vec!["a.mp4".to_string()]);
        assert_eq!(s.set_step(Step::Edit).unwrap(), Step::Upload);

        assert!(s.set_step(Step::Download).is_err());
        s.items = featured_items();
        s.select_track(Some(0)).unwrap();
        assert!(s.set_step(Step::Download).is_err());
        s.set_window(0.0, 120.0).unwrap();
        assert_eq!(s.set_step(Step::Download).unwrap(), Step::Edit);

        // Going back is always allowed
        assert_eq!(s.set_step(Step::Upload).unwrap(), Step::Download);
    }

    #[test]
    fn test_download_step_reports_missing_prerequisite() {
        let mut s = CreateSession::new();
        s.add_files(vec!["a.mp4".to_string()]);
        s.items = featured_items();

        assert!(matches!(
            s.set_step(Step::Download),
            Err(CreateError::StepBlocked { step: "download", reason: "no track selected" })
        ));

        s.select_track(Some(2)).unwrap();
        assert!(matches!(
            s.set_step(Step::Download),
            Err(CreateError::StepBlocked { reason: "no snippet window set", .. })
        ));
        assert_eq!(s.step, Step::Upload);

        s.set_window(10.0, 90.0).unwrap();
        assert_eq!(s.set_step(Step::Download).unwrap(), Step::Upload);
        assert_eq!(s.step, Step::Download);
    }

    #[test]
    fn test_select_track_bounds() {
        let mut s = CreateSession::new();
        assert!(matches!(
            s.select_track(Some(0)),
            Err(CreateError::TrackIndexOutOfRange { index: 0, len: 0 })
        ));
        s.items = featured_items();
        s.select_track(Some(8)).unwrap();
        assert_eq!(s.selected_track.as_ref().unwrap().title, "Montero");
        s.select_track(None).unwrap();
        assert!(s.selected_track.is_none());
    }

    #[test]
    fn test_set_window_validation() {
        let mut s = CreateSession::new();
        assert!(s.set_window(0.0, 0.0).is_err());
        assert!(s.set_window(-1.0, 100.0).is_err());

        let w = s.set_window(95.0, 100.0).unwrap();
        assert_eq!(w.start(), 70.0);
        assert_eq!(w.end(), 100.0);
    }

    #[test]
    fn test_finalize_descriptor() {
        let mut s = ready_session();
        let d = s.finalize().unwrap();
        assert_eq!(d.download_name, "Blinding Lights.mp3");
        assert_eq!(d.file.as_deref(), Some("a.mp4"));
        assert_eq!(d.start_time, 40.0);
        assert_eq!(d.end_time, 70.0);
        assert_eq!(s.step, Step::Download);

        // Same processing id on repeat
        let again = s.finalize().unwrap();
        assert_eq!(again.processing_id, d.processing_id);
    }

    #[test]
    fn test_download_name_fallback() {
        assert_eq!(download_name("Stay"), "Stay.mp3");
        assert_eq!(download_name("  "), "track.mp3");
    }

    #[tokio::test]
    async fn test_store_roundtrip_and_recommendations() {
        let store = SessionStore::with_recommendations_delay(Duration::from_millis(1));
        let session = store.create().await;
        assert_eq!(store.len().await, 1);

        let items = store.load_recommendations(&session.id).await.unwrap();
        assert_eq!(items.len(), 9);
        assert_eq!(store.get(&session.id).await.unwrap().items.len(), 9);

        assert!(matches!(
            store.get("missing").await,
            Err(CreateError::SessionNotFound(_))
        ));
        assert!(store.load_recommendations("missing").await.is_err());

        store.remove(&session.id).await.unwrap();
        assert!(store.is_empty().await);
    }
}
