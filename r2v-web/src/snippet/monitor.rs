//! Playback polling state machine
//!
//! The client polls its player every [`POLL_INTERVAL`](super::POLL_INTERVAL)
//! and feeds the position here. The monitor answers with the command the
//! client should apply: pause at the end of the preview window, or nudge a
//! player that reports playing but has stopped advancing.

use serde::Serialize;

use super::{SnippetWindow, RECOVERY_NUDGE, STUCK_THRESHOLD, STUCK_TOLERANCE};

/// Action for the client's player
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PlayerCommand {
    None,
    Pause,
    Seek { to: f64, resume: bool },
}

#[derive(Debug, Clone)]
pub struct PlaybackMonitor {
    window: SnippetWindow,
    preview: bool,
    last_position: Option<f64>,
    stuck_polls: u32,
}

impl PlaybackMonitor {
    /// Monitor over `window` with preview mode on
    pub fn new(window: SnippetWindow) -> Self {
        Self {
            window,
            preview: true,
            last_position: None,
            stuck_polls: 0,
        }
    }

    pub fn window(&self) -> &SnippetWindow {
        &self.window
    }

    pub fn set_window(&mut self, window: SnippetWindow) {
        self.window = window;
        self.reset_stuck();
    }

    pub fn preview(&self) -> bool {
        self.preview
    }

    pub fn set_preview(&mut self, preview: bool) {
        self.preview = preview;
    }

    pub fn stuck_polls(&self) -> u32 {
        self.stuck_polls
    }

    fn reset_stuck(&mut self) {
        self.stuck_polls = 0;
        self.last_position = None;
    }

    /// Process one poll
    ///
    /// Reaching the window end in preview mode wins over stuck recovery.
    pub fn poll(&mut self, position: f64, is_playing: bool) -> PlayerCommand {
        if !is_playing {
            self.stuck_polls = 0;
            self.last_position = Some(position);
            return PlayerCommand::None;
        }

        match self.last_position {
            Some(last) if (position - last).abs() < STUCK_TOLERANCE => self.stuck_polls += 1,
            _ => self.stuck_polls = 0,
        }
        self.last_position = Some(position);

        if self.preview && position >= self.window.end() {
            self.stuck_polls = 0;
            return PlayerCommand::Pause;
        }

        if self.stuck_polls > STUCK_THRESHOLD {
            self.reset_stuck();
            return PlayerCommand::Seek {
                to: position + RECOVERY_NUDGE,
                resume: true,
            };
        }

        PlayerCommand::None
    }

    /// Position to start playback from when the user presses play at
    /// `current`
    pub fn play_from(&mut self, current: f64) -> f64 {
        self.reset_stuck();
        if self.preview && current < self.window.start() {
            self.window.start()
        } else {
            current
        }
    }

    /// Position the reset control returns to
    pub fn reset_position(&mut self) -> f64 {
        self.reset_stuck();
        if self.preview {
            self.window.start()
        } else {
            0.0
        }
    }
}
