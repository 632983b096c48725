//! Text width measurement.
//!
//! The renderer never assumes a constant glyph advance: every horizontal
//! position is derived from a measurement, so a monospace font is a
//! convenience of the host, not a requirement of the search.

use crate::text::TextSnapshot;

/// Measures text in the host's current font.
pub trait TextMetrics {
    /// Width in pixels of `text` laid out on one line.
    fn measure_str(&self, text: &str) -> f32;

    /// Width in pixels of the snapshot's char range `[start..end)`.
    ///
    /// Out-of-bounds or inverted ranges measure as zero.
    fn measure_range(&self, text: &TextSnapshot, start: usize, end: usize) -> f32 {
        text.slice_to_string(start, end)
            .map(|s| self.measure_str(&s))
            .unwrap_or(0.0)
    }
}

impl<M: TextMetrics + ?Sized> TextMetrics for &M {
    fn measure_str(&self, text: &str) -> f32 {
        (**self).measure_str(text)
    }

    fn measure_range(&self, text: &TextSnapshot, start: usize, end: usize) -> f32 {
        (**self).measure_range(text, start, end)
    }
}

impl<M: TextMetrics + ?Sized> TextMetrics for Box<M> {
    fn measure_str(&self, text: &str) -> f32 {
        (**self).measure_str(text)
    }

    fn measure_range(&self, text: &TextSnapshot, start: usize, end: usize) -> f32 {
        (**self).measure_range(text, start, end)
    }
}

/// Fixed advance per character, for headless rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
}

impl MonospaceMetrics {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure_str(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn measure_range(&self, text: &TextSnapshot, start: usize, end: usize) -> f32 {
        if start > end || end > text.len_chars() {
            return 0.0;
        }
        (end - start) as f32 * self.advance
    }
}
