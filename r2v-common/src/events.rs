//! Event types for the Reels2Vec event system
//!
//! Provides the shared event enum and the broadcast-backed EventBus that
//! feeds the `/api/events` SSE stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::{IndexingTask, TaskStatus};

/// Reels2Vec event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum R2vEvent {
    /// A mock indexing task moved to a new status
    TaskStatusChanged {
        task: IndexingTask,
        old_status: TaskStatus,
        timestamp: DateTime<Utc>,
    },

    /// Files were accepted by the upload endpoint
    FilesUploaded {
        /// Stored filenames
        filenames: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// A snippet window was submitted for processing
    SnippetSubmitted {
        submission_id: String,
        video_id: String,
        start_time: f64,
        end_time: f64,
        timestamp: DateTime<Utc>,
    },

    /// A create-wizard session moved between steps
    CreateStepChanged {
        session_id: String,
        step: String,
        timestamp: DateTime<Utc>,
    },
}

impl R2vEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            R2vEvent::TaskStatusChanged { .. } => "TaskStatusChanged",
            R2vEvent::FilesUploaded { .. } => "FilesUploaded",
            R2vEvent::SnippetSubmitted { .. } => "SnippetSubmitted",
            R2vEvent::CreateStepChanged { .. } => "CreateStepChanged",
        }
    }
}

/// Broadcast bus for in-process events
///
/// Cloning is cheap; all clones share one channel. Events emitted before a
/// subscriber subscribes are not delivered to it.
///
/// # Examples
///
/// ```
/// use r2v_common::events::{EventBus, R2vEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(R2vEvent::FilesUploaded {
///     filenames: vec!["a.mp4".to_string()],
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<R2vEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<R2vEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: R2vEvent) -> Result<usize, broadcast::error::SendError<R2vEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the absence of subscribers
    pub fn emit_lossy(&self, event: R2vEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
