//! Snippet window geometry

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::WINDOW_SECONDS;

/// A [`WINDOW_SECONDS`] range inside a track of `duration` seconds
///
/// `start` is kept within `[0, max_start()]` by every mutator, so the
/// window never leaves the media bounds. Tracks shorter than the window
/// get a window ending at `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnippetWindow {
    duration: f64,
    start: f64,
}

/// Pixel columns for drawing the selection over a waveform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub start_x: f64,
    pub end_x: f64,
    pub cursor_x: f64,
}

impl SnippetWindow {
    /// New window at the start of the track
    ///
    /// Negative or non-finite durations are treated as zero.
    pub fn new(duration: f64) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            duration,
            start: 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        (self.start + WINDOW_SECONDS).min(self.duration)
    }

    /// Latest allowed start
    pub fn max_start(&self) -> f64 {
        (self.duration - WINDOW_SECONDS).max(0.0)
    }

    /// Move the window start, clamped into range
    pub fn set_start(&mut self, start: f64) {
        self.start = if start.is_finite() {
            start.clamp(0.0, self.max_start())
        } else {
            0.0
        };
    }

    /// Centre the window on `time`
    pub fn center_on(&mut self, time: f64) {
        self.set_start(time - WINDOW_SECONDS / 2.0);
    }

    /// Handle a click at `x` on a surface `width` pixels wide
    ///
    /// Centres the window on the clicked time and returns that time, which
    /// the player should seek to. Returns `None` for an empty surface or
    /// a zero-length track.
    pub fn select_at(&mut self, x: f64, width: f64) -> Option<f64> {
        if !(width > 0.0) || self.duration <= 0.0 || !x.is_finite() {
            return None;
        }
        let time = (x / width * self.duration).clamp(0.0, self.duration);
        self.center_on(time);
        Some(time)
    }

    /// Pixel positions of the window edges and of `current` on a surface
    /// `width` pixels wide
    pub fn overlay(&self, width: f64, current: f64) -> Overlay {
        if self.duration <= 0.0 {
            return Overlay {
                start_x: 0.0,
                end_x: 0.0,
                cursor_x: 0.0,
            };
        }
        let to_x = |t: f64| t / self.duration * width;
        Overlay {
            start_x: to_x(self.start),
            end_x: to_x(self.end()),
            cursor_x: to_x(current.clamp(0.0, self.duration)),
        }
    }
}

impl Serialize for SnippetWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SnippetWindow", 3)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end())?;
        state.serialize_field("duration", &self.duration)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_and_max_start() {
        let w = SnippetWindow::new(200.0);
        assert_eq!(w.end(), 30.0);
        assert_eq!(w.max_start(), 170.0);

        let short = SnippetWindow::new(12.0);
        assert_eq!(short.end(), 12.0);
        assert_eq!(short.max_start(), 0.0);
    }

    #[test]
    fn test_set_start_clamps() {
        let mut w = SnippetWindow::new(100.0);
        w.set_start(-5.0);
        assert_eq!(w.start(), 0.0);
        w.set_start(95.0);
        assert_eq!(w.start(), 70.0);
        assert_eq!(w.end(), 100.0);
        w.set_start(f64::NAN);
        assert_eq!(w.start(), 0.0);
    }

    #[test]
    fn test_center_on() {
        let mut w = SnippetWindow::new(200.0);
        w.center_on(100.0);
        assert_eq!(w.start(), 85.0);
        w.center_on(5.0);
        assert_eq!(w.start(), 0.0);
        w.center_on(199.0);
        assert_eq!(w.start(), 170.0);
    }

    #[test]
    fn test_select_at_returns_click_time() {
        let mut w = SnippetWindow::new(200.0);
        let seek = w.select_at(400.0, 800.0).unwrap();
        assert_eq!(seek, 100.0);
        assert_eq!(w.start(), 85.0);

        assert_eq!(w.select_at(900.0, 800.0), Some(200.0));
        assert_eq!(w.start(), 170.0);

        assert!(w.select_at(10.0, 0.0).is_none());
        assert!(SnippetWindow::new(0.0).select_at(10.0, 800.0).is_none());
    }

    #[test]
    fn test_window_never_leaves_bounds() {
        for duration in [0.0, 10.0, 29.9, 30.0, 31.0, 240.0] {
            let mut w = SnippetWindow::new(duration);
            for x in [-100.0, 0.0, 1.0, 399.0, 800.0, 5000.0] {
                w.select_at(x, 800.0);
                assert!(w.start() >= 0.0);
                assert!(w.end() <= duration.max(0.0));
                assert!(w.end() - w.start() <= WINDOW_SECONDS);
            }
        }
    }

    #[test]
    fn test_overlay() {
        let mut w = SnippetWindow::new(200.0);
        w.set_start(50.0);
        let o = w.overlay(800.0, 60.0);
        assert_eq!(o.start_x, 200.0);
        assert_eq!(o.end_x, 320.0);
        assert_eq!(o.cursor_x, 240.0);
    }

    #[test]
    fn test_serializes_end() {
        let mut w = SnippetWindow::new(100.0);
        w.set_start(80.0);
        let json = serde_json::to_value(w).unwrap();
        assert_eq!(json["start"], 70.0);
        assert_eq!(json["end"], 100.0);
        assert_eq!(json["duration"], 100.0);
    }
}
