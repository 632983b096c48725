//! Coalescing per-character colors into runs, and drawing a line's runs.
//!
//! One draw operation is emitted per maximal same-colored span of the
//! visible text, so the draw-call count follows the number of color
//! transitions on screen rather than the number of characters.

use std::ops::Range;

use code_canvas_config::HexColor;

use crate::canvas::{Canvas, TextRun};
use crate::layout::LineGeometry;
use crate::metrics::TextMetrics;
use crate::text::TextSnapshot;
use crate::tokens::HighlightTokens;

/// A maximal span of characters sharing one color. Lives for one draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRun {
    pub start: usize,
    pub end: usize,
    pub color: HexColor,
}

impl ColorRun {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Iterator over the color runs of a char range.
#[derive(Debug, Clone)]
pub struct ColorRuns<'a> {
    tokens: &'a HighlightTokens,
    pos: usize,
    end: usize,
}

impl Iterator for ColorRuns<'_> {
    type Item = ColorRun;

    fn next(&mut self) -> Option<ColorRun> {
        if self.pos >= self.end {
            return None;
        }
        let start = self.pos;
        let color = self.tokens.char_color(start)?;
        self.pos += 1;
        while self.pos < self.end && self.tokens.char_color(self.pos) == Some(color) {
            self.pos += 1;
        }
        Some(ColorRun {
            start,
            end: self.pos,
            color,
        })
    }
}

/// Runs covering `span`, truncated to the characters the tokens know about.
pub fn coalesce_runs(tokens: &HighlightTokens, span: Range<usize>) -> ColorRuns<'_> {
    ColorRuns {
        tokens,
        pos: span.start,
        end: span.end.min(tokens.len()),
    }
}

/// What happened to one line's code during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Colored runs were drawn.
    Colored { runs: usize },
    /// The visible span was empty.
    Empty,
    /// The line starts past the token map; nothing colored was drawn.
    Stale,
    /// No token map has been published yet.
    Untokenized,
}

/// Draws the colored code of single lines.
#[derive(Debug)]
pub struct RunDrawer<'a, M: ?Sized> {
    pub metrics: &'a M,
    pub text: &'a TextSnapshot,
    /// Left edge of the text area (the gutter padding).
    pub origin_x: f32,
    /// Added to every baseline (the non-scrollable top inset).
    pub origin_y: f32,
    /// Color of fallback text for spans without tokens.
    pub fallback_color: HexColor,
}

impl<M: TextMetrics + ?Sized> RunDrawer<'_, M> {
    /// Draws `span` of `line`, clipped to the line's visible end.
    pub fn draw_line<C: Canvas + ?Sized>(
        &self,
        line: &LineGeometry,
        span: Range<usize>,
        tokens: Option<&HighlightTokens>,
        canvas: &mut C,
    ) -> LineOutcome {
        let span = span.start.max(line.start)..span.end.min(line.visible_end);
        if span.is_empty() {
            return LineOutcome::Empty;
        }
        let Some(tokens) = tokens else {
            self.emit(line, span, self.fallback_color, canvas, C::draw_fallback);
            return LineOutcome::Untokenized;
        };
        if line.start >= tokens.len() {
            tracing::trace!(
                line = line.line,
                tokens_len = tokens.len(),
                "skipping line past stale tokens"
            );
            self.emit(line, span, self.fallback_color, canvas, C::draw_fallback);
            return LineOutcome::Stale;
        }

        let mut runs = 0;
        for run in coalesce_runs(tokens, span.clone()) {
            self.emit(line, run.range(), run.color, canvas, C::draw_run);
            runs += 1;
        }
        // Tokens ending inside the line leave an uncolored tail.
        if span.end > tokens.len() {
            let tail = tokens.len().max(span.start)..span.end;
            self.emit(line, tail, self.fallback_color, canvas, C::draw_fallback);
        }
        LineOutcome::Colored { runs }
    }

    fn emit<C: Canvas + ?Sized>(
        &self,
        line: &LineGeometry,
        range: Range<usize>,
        color: HexColor,
        canvas: &mut C,
        draw: fn(&mut C, &TextRun),
    ) {
        let Ok(text) = self.text.slice_to_string(range.start, range.end) else {
            return;
        };
        // Offsets are measured from the line start, not from the viewport edge.
        let offset = self.metrics.measure_range(self.text, line.start, range.start);
        let run = TextRun {
            line: line.line,
            start: range.start,
            end: range.end,
            text,
            x: self.origin_x + offset,
            baseline: self.origin_y + line.baseline,
            color,
        };
        draw(canvas, &run);
    }
}
