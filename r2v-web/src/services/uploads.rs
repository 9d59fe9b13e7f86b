//! Upload storage
//!
//! Accepted files are written to the upload directory under a random
//! `{uuid-hex}.{ext}` name; the client-supplied name is only recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "m4a"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Broad media class of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Video,
    Audio,
    Image,
    Unknown,
}

/// Lower-cased extension of `filename`, if it has one
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

/// Classify a filename by extension
pub fn classify(filename: &str) -> FileType {
    match extension_of(filename) {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => FileType::Video,
        Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => FileType::Audio,
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => FileType::Image,
        _ => FileType::Unknown,
    }
}

/// Whether the extension is on the allow list
pub fn is_allowed(filename: &str) -> bool {
    classify(filename) != FileType::Unknown
}

/// Metadata of one stored upload
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub filename: String,
    pub original_filename: String,
    pub file_size: u64,
    pub file_type: FileType,
    pub upload_path: String,
    pub created_at: DateTime<Utc>,
}

/// Directory-backed upload store
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Store `bytes` for a client file named `original`
    ///
    /// The caller has already checked [`is_allowed`].
    pub async fn save(&self, original: &str, bytes: &[u8]) -> std::io::Result<StoredFile> {
        self.ensure_dir().await?;

        let ext = extension_of(original).unwrap_or_default();
        let filename = format!("{}.{}", Uuid::new_v4().simple(), ext);
        let path = self.dir.join(&filename);

        fs::write(&path, bytes).await?;
        info!(
            original = %original,
            stored = %filename,
            bytes = bytes.len(),
            "Stored upload"
        );

        Ok(StoredFile {
            original_filename: original.to_string(),
            file_size: bytes.len() as u64,
            file_type: classify(original),
            upload_path: path.to_string_lossy().into_owned(),
            created_at: Utc::now(),
            filename,
        })
    }

    /// Path of a stored file by its stored name
    ///
    /// Returns `None` for names that could escape the directory or that do
    /// not exist.
    pub async fn path_of(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            debug!(filename = %filename, "Rejected upload lookup");
            return None;
        }

        let path = self.dir.join(filename);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }
}
