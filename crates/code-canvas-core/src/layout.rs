//! Line geometry supplied by the host text-layout engine.
//!
//! Geometry is derived on demand and never cached across frames.

use crate::text::TextSnapshot;
use crate::viewport::VisibleLineRange;

/// Host text-layout engine.
///
/// Vertical coordinates are in content space, with line 0 starting at `0.0`.
pub trait LineLayout {
    fn line_count(&self) -> usize;

    /// Top of `line`. Must accept `line == line_count()`, returning the content bottom.
    fn line_top(&self, line: usize) -> f32;

    fn line_descent(&self, line: usize) -> f32;

    /// First char index of `line`.
    fn line_start(&self, line: usize) -> usize;

    /// End of the drawable text of `line`, excluding its line break.
    fn line_visible_end(&self, line: usize) -> usize;

    /// Line containing the vertical offset `y`, clamped to the existing lines.
    fn line_for_vertical(&self, y: f32) -> usize;

    fn line_bottom(&self, line: usize) -> f32 {
        self.line_top(line + 1)
    }

    fn line_baseline(&self, line: usize) -> f32 {
        self.line_bottom(line) - self.line_descent(line)
    }

    /// First and last lines whose vertical extent intersects `[top, bottom)`.
    fn line_range_for_band(&self, top: f32, bottom: f32) -> Option<VisibleLineRange> {
        let count = self.line_count();
        if count == 0 {
            return None;
        }
        if top.is_nan() || bottom.is_nan() {
            return None;
        }
        let top = top.max(0.0);
        let bottom = bottom.min(self.line_top(count));
        if top >= bottom {
            return None;
        }
        let first = self.line_for_vertical(top);
        let mut last = self.line_for_vertical(bottom);
        if last > first && self.line_top(last) >= bottom {
            last -= 1;
        }
        Some(VisibleLineRange::new(first, last.min(count - 1)))
    }
}

/// Geometry of one line, valid for a single draw pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    pub line: usize,
    pub start: usize,
    pub visible_end: usize,
    pub top: f32,
    pub baseline: f32,
    pub bottom: f32,
}

impl LineGeometry {
    pub fn of<L: LineLayout + ?Sized>(layout: &L, line: usize) -> Self {
        let start = layout.line_start(line);
        Self {
            line,
            start,
            visible_end: layout.line_visible_end(line).max(start),
            top: layout.line_top(line),
            baseline: layout.line_baseline(line),
            bottom: layout.line_bottom(line),
        }
    }
}

/// Fixed line height layout over a text snapshot, without soft wrapping.
#[derive(Debug, Clone)]
pub struct UniformLineLayout {
    text: TextSnapshot,
    line_height: f32,
    descent: f32,
}

impl UniformLineLayout {
    pub fn new(text: TextSnapshot, line_height: f32, descent: f32) -> Self {
        Self {
            text,
            line_height,
            descent,
        }
    }

    pub fn text(&self) -> &TextSnapshot {
        &self.text
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    fn line_end(&self, line: usize) -> usize {
        self.text
            .line_to_char(line + 1)
            .unwrap_or_else(|_| self.text.len_chars())
    }
}

impl LineLayout for UniformLineLayout {
    /// An empty document has no lines to draw.
    fn line_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.len_lines()
        }
    }

    fn line_top(&self, line: usize) -> f32 {
        line as f32 * self.line_height
    }

    fn line_descent(&self, _line: usize) -> f32 {
        self.descent
    }

    fn line_start(&self, line: usize) -> usize {
        self.text
            .line_to_char(line)
            .unwrap_or_else(|_| self.text.len_chars())
    }

    fn line_visible_end(&self, line: usize) -> usize {
        let start = self.line_start(line);
        let end = self.line_end(line);
        if end > start && self.text.char_at(end - 1).is_ok_and(|c| c == '\n') {
            end - 1
        } else {
            end
        }
    }

    fn line_for_vertical(&self, y: f32) -> usize {
        let count = self.line_count();
        if count == 0 || !(self.line_height > 0.0) {
            return 0;
        }
        let line = (y / self.line_height).floor().max(0.0) as usize;
        line.min(count - 1)
    }
}
