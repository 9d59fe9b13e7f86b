//! Decorative waveform
//!
//! The selector has no access to decoded audio, so it draws a synthetic
//! shape: a slow sine, a faster cosine and some noise. It carries no
//! information about the track.

use rand::Rng;
use serde::Serialize;

/// Fraction of the half-height a full-scale bar may use
const BAR_SCALE: f64 = 0.8;

/// Largest accepted surface width
pub const MAX_WIDTH: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Column {
    pub x: u32,
    pub amplitude: f64,
    pub bar_height: f64,
}

/// One amplitude per pixel column for a track of `duration` seconds
pub fn synthetic<R: Rng + ?Sized>(duration: f64, width: u32, rng: &mut R) -> Vec<f64> {
    (0..width)
        .map(|i| {
            let t = i as f64 / width as f64 * duration;
            (t * 0.5).sin() * 0.5 + (t * 2.0).cos() * 0.2 + rng.gen::<f64>() * 0.3
        })
        .collect()
}

/// Bar length drawn upward from the centre line of a `height` surface
pub fn bar_height(amplitude: f64, height: f64) -> f64 {
    amplitude * (height / 2.0) * BAR_SCALE
}

/// Columns ready to draw on a `width` x `height` surface
pub fn columns<R: Rng + ?Sized>(duration: f64, width: u32, height: f64, rng: &mut R) -> Vec<Column> {
    synthetic(duration, width, rng)
        .into_iter()
        .enumerate()
        .map(|(x, amplitude)| Column {
            x: x as u32,
            amplitude,
            bar_height: bar_height(amplitude, height),
        })
        .collect()
}
