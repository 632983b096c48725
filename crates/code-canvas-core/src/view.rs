//! The code view: per-frame rendering pipeline and the collaborator-facing API.
//!
//! Each draw pass recomputes the gutter padding, resolves the visible line
//! band, then draws every visible line's number and colored code. Nothing
//! is cached between passes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use code_canvas_config::{CanvasColors, CanvasConfig, HexColor};

use crate::canvas::Canvas;
use crate::cursor::{CursorChangeListener, CursorLineNotifier};
use crate::gutter::GutterLayout;
use crate::layout::{LineGeometry, LineLayout};
use crate::metrics::TextMetrics;
use crate::runs::{LineOutcome, RunDrawer};
use crate::search::{char_index_at_x, visible_char_span};
use crate::text::{TextBuffer, TextStorage};
use crate::tokens::{HighlightTokens, RedrawSignal, TokenPublisher, TokenSlot};
use crate::viewport::{
    horizontal_span, resolve_visible_lines, ScrollFrame, ScrollFrameProvider, VisibleLineRange,
};

/// Colors the view needs from the active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub line_number_color: HexColor,
    /// Color of text drawn without highlight tokens.
    pub text_color: HexColor,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from(&CanvasColors::default())
    }
}

impl From<&CanvasColors> for Theme {
    fn from(colors: &CanvasColors) -> Self {
        Self {
            line_number_color: colors.line_number_color,
            text_color: colors.text_color,
        }
    }
}

/// Summary of one draw pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawReport {
    /// The resolved line band, `None` when nothing was visible.
    pub visible: Option<VisibleLineRange>,
    pub lines_drawn: usize,
    pub runs_drawn: usize,
    /// Lines skipped because the token map is older than the text.
    pub stale_lines: usize,
    /// Lines drawn while no token map was published.
    pub untokenized_lines: usize,
    /// The gutter padding changed, so the host has to relayout.
    pub padding_changed: bool,
    pub elapsed: Duration,
}

/// Assembles a [`CodeView`] from its collaborators.
pub struct CodeViewBuilder {
    storage: Option<Box<dyn TextStorage>>,
    metrics: Option<Box<dyn TextMetrics>>,
    frame: Option<Box<dyn ScrollFrameProvider>>,
    theme: Theme,
    gutter: GutterLayout,
    top_inset: f32,
    redraw: RedrawSignal,
}

impl Default for CodeViewBuilder {
    fn default() -> Self {
        Self {
            storage: None,
            metrics: None,
            frame: None,
            theme: Theme::default(),
            gutter: GutterLayout::default(),
            top_inset: 0.0,
            redraw: RedrawSignal::default(),
        }
    }
}

impl CodeViewBuilder {
    /// Builder preloaded with the gutter and inset settings of `config`.
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            gutter: GutterLayout::new(config.gutter_margin, config.gutter_label_inset),
            top_inset: config.top_inset,
            ..Self::default()
        }
    }

    /// Text storage; an empty [`TextBuffer`] when not set.
    pub fn storage(mut self, storage: impl TextStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn metrics(mut self, metrics: impl TextMetrics + 'static) -> Self {
        self.metrics = Some(Box::new(metrics));
        self
    }

    pub fn scroll_frame(mut self, frame: impl ScrollFrameProvider + 'static) -> Self {
        self.frame = Some(Box::new(frame));
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn gutter(mut self, gutter: GutterLayout) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn top_inset(mut self, top_inset: f32) -> Self {
        self.top_inset = top_inset;
        self
    }

    /// Called, from any thread, whenever the view wants to be redrawn.
    pub fn redraw_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.redraw = RedrawSignal::with_waker(waker);
        self
    }

    /// # Errors
    ///
    /// Fails when the scroll frame or the text metrics were not supplied.
    pub fn build(self) -> Result<CodeView> {
        let Some(frame) = self.frame else {
            anyhow::bail!("code view needs a scroll frame provider");
        };
        let Some(metrics) = self.metrics else {
            anyhow::bail!("code view needs text metrics");
        };
        Ok(CodeView {
            storage: self
                .storage
                .unwrap_or_else(|| Box::new(TextBuffer::default())),
            metrics,
            frame,
            theme: self.theme,
            tokens: Arc::new(TokenSlot::default()),
            redraw: self.redraw,
            notifier: CursorLineNotifier::default(),
            gutter: self.gutter,
            left_padding: 0.0,
            top_inset: self.top_inset,
        })
    }
}

/// Syntax-colored, viewport-aware renderer for one text surface.
pub struct CodeView {
    storage: Box<dyn TextStorage>,
    metrics: Box<dyn TextMetrics>,
    frame: Box<dyn ScrollFrameProvider>,
    theme: Theme,
    tokens: Arc<TokenSlot>,
    redraw: RedrawSignal,
    notifier: CursorLineNotifier,
    gutter: GutterLayout,
    left_padding: f32,
    top_inset: f32,
}

impl std::fmt::Debug for CodeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeView")
            .field("theme", &self.theme)
            .field("tokens", &self.tokens)
            .field("notifier", &self.notifier)
            .field("gutter", &self.gutter)
            .field("left_padding", &self.left_padding)
            .field("top_inset", &self.top_inset)
            .finish_non_exhaustive()
    }
}

impl CodeView {
    pub fn builder() -> CodeViewBuilder {
        CodeViewBuilder::default()
    }

    // ── Collaborator API ───────────────────────────────────────────

    /// Replaces the active theme and requests a redraw.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.redraw.request();
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Publishes a new token snapshot and requests a redraw.
    pub fn update_highlight_tokens(&self, tokens: HighlightTokens) {
        self.token_publisher().publish(tokens);
    }

    pub fn clear_highlight_tokens(&self) {
        self.tokens.clear();
        self.redraw.request();
    }

    /// Handle for a background highlighter to publish through.
    pub fn token_publisher(&self) -> TokenPublisher {
        TokenPublisher::new(Arc::clone(&self.tokens), self.redraw.clone())
    }

    pub fn highlight_tokens(&self) -> Option<Arc<HighlightTokens>> {
        self.tokens.load()
    }

    /// Registers the sole cursor-change listener, replacing any previous one.
    pub fn set_cursor_change_listener(&mut self, listener: impl CursorChangeListener + 'static) {
        self.notifier.set_listener(listener);
    }

    /// Places the caret at `index`, clamped into `[0, text length]`.
    /// Returns the index actually used.
    pub fn set_selection(&mut self, index: isize) -> usize {
        let len = self.storage.text().len_chars();
        let index = usize::try_from(index).unwrap_or(0).min(len);
        self.storage.select(index, index);
        self.selection_changed();
        index
    }

    /// Forwards the storage's current selection to the cursor listener.
    /// Returns whether the listener was notified.
    pub fn selection_changed(&mut self) -> bool {
        let text = self.storage.text();
        let (start, end) = self.storage.selection();
        self.notifier.on_selection_changed(&text, start, end)
    }

    pub fn storage(&self) -> &dyn TextStorage {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn TextStorage {
        self.storage.as_mut()
    }

    pub fn metrics(&self) -> &dyn TextMetrics {
        self.metrics.as_ref()
    }

    /// Left padding currently reserved for the gutter.
    pub fn left_padding(&self) -> f32 {
        self.left_padding
    }

    pub fn top_inset(&self) -> f32 {
        self.top_inset
    }

    pub fn scroll_frame(&self) -> ScrollFrame {
        self.frame.scroll_frame()
    }

    /// Returns whether a redraw was requested since the last call.
    pub fn take_redraw_request(&self) -> bool {
        self.redraw.take()
    }

    // ── Rendering ──────────────────────────────────────────────────

    /// Runs one draw pass. Coordinates handed to `canvas` are in content
    /// space: the gutter starts at `x = 0`, the first line at `y = top_inset`.
    pub fn draw<L, C>(&mut self, layout: &L, canvas: &mut C) -> DrawReport
    where
        L: LineLayout + ?Sized,
        C: Canvas + ?Sized,
    {
        let started = Instant::now();
        let mut report = DrawReport::default();

        let line_count = layout.line_count();
        report.padding_changed =
            self.gutter
                .apply(&mut self.left_padding, line_count, self.metrics.as_ref());
        if report.padding_changed {
            self.redraw.request();
        }

        let frame = self.frame.scroll_frame();
        let Some(range) = resolve_visible_lines(layout, &frame, self.top_inset) else {
            report.elapsed = started.elapsed();
            tracing::trace!(line_count, "nothing visible");
            return report;
        };
        report.visible = Some(range);

        // One snapshot for the whole pass, even if a new one is published meanwhile.
        let tokens = self.tokens.load();
        let text = self.storage.text();
        let metrics = self.metrics.as_ref();
        let (left, right) = horizontal_span(&frame, self.left_padding);
        let drawer = RunDrawer {
            metrics,
            text: &text,
            origin_x: self.left_padding,
            origin_y: self.top_inset,
            fallback_color: self.theme.text_color,
        };

        for line in range.lines() {
            let geometry = LineGeometry::of(layout, line);
            let label = self.gutter.label(
                line,
                self.left_padding,
                self.top_inset + geometry.baseline,
                metrics,
                self.theme.line_number_color,
            );
            canvas.draw_line_number(&label);

            let span = visible_char_span(
                metrics,
                &text,
                left,
                right,
                geometry.start,
                geometry.visible_end,
            );
            match drawer.draw_line(&geometry, span, tokens.as_deref(), canvas) {
                LineOutcome::Colored { runs } => report.runs_drawn += runs,
                LineOutcome::Stale => report.stale_lines += 1,
                LineOutcome::Untokenized => report.untokenized_lines += 1,
                LineOutcome::Empty => {}
            }
            report.lines_drawn += 1;
        }

        report.elapsed = started.elapsed();
        tracing::debug!(
            first = range.first,
            last = range.last,
            lines = report.lines_drawn,
            runs = report.runs_drawn,
            stale = report.stale_lines,
            elapsed_us = report.elapsed.as_micros() as u64,
            "draw pass"
        );
        report
    }

    /// Char index closest to the content-space point `(x, y)`, for caret placement.
    pub fn hit_test<L: LineLayout + ?Sized>(&self, layout: &L, x: f32, y: f32) -> usize {
        if layout.line_count() == 0 {
            return 0;
        }
        let line = layout.line_for_vertical(y - self.top_inset);
        let start = layout.line_start(line);
        let end = layout.line_visible_end(line).max(start);
        let text = self.storage.text();
        let metrics = self.metrics.as_ref();
        let x = x - self.left_padding;

        let index = char_index_at_x(metrics, &text, x, start, end);
        if index >= end {
            return end;
        }
        // Snap to whichever edge of the glyph is nearer.
        let left = metrics.measure_range(&text, start, index);
        let right = metrics.measure_range(&text, start, index + 1);
        if x - left > right - x {
            index + 1
        } else {
            index
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::layout::UniformLineLayout;
    use crate::metrics::MonospaceMetrics;
    use crate::viewport::SharedScrollFrame;

    const KW: HexColor = HexColor::rgb(200, 0, 0);

    fn view(text: &str, frame: ScrollFrame) -> CodeView {
        CodeView::builder()
            .storage(TextBuffer::new(text))
            .metrics(MonospaceMetrics::new(10.0))
            .scroll_frame(frame)
            .build()
            .unwrap()
    }

    fn layout_of(view: &CodeView) -> UniformLineLayout {
        UniformLineLayout::new(view.storage().text(), 20.0, 4.0)
    }

    // ── builder ────────────────────────────────────────────────────

    #[test]
    fn test_build_without_scroll_frame_is_a_config_error() {
        let err = CodeView::builder()
            .metrics(MonospaceMetrics::new(10.0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("scroll frame"));
    }

    #[test]
    fn test_build_without_metrics_is_a_config_error() {
        let err = CodeView::builder()
            .scroll_frame(ScrollFrame::default())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("metrics"));
    }

    #[test]
    fn test_from_config_copies_gutter_settings() {
        let mut config = CanvasConfig::default();
        config.gutter_margin = 30.0;
        config.top_inset = 6.0;
        let view = CodeViewBuilder::from_config(&config)
            .metrics(MonospaceMetrics::new(10.0))
            .scroll_frame(ScrollFrame::default())
            .build()
            .unwrap();
        assert!((view.top_inset() - 6.0).abs() < f32::EPSILON);
        assert_eq!(view.gutter.margin, 30.0);
    }

    // ── redraw requests ────────────────────────────────────────────

    #[test]
    fn test_theme_and_tokens_request_redraws() {
        let mut v = view("abc", ScrollFrame::with_size(100.0, 100.0));
        assert!(!v.take_redraw_request());

        v.set_theme(Theme {
            line_number_color: KW,
            text_color: KW,
        });
        assert!(v.take_redraw_request());
        assert_eq!(v.theme().line_number_color, KW);

        v.update_highlight_tokens(HighlightTokens::uniform(3, KW));
        assert!(v.take_redraw_request());
        assert_eq!(v.highlight_tokens().unwrap().len(), 3);

        v.clear_highlight_tokens();
        assert!(v.take_redraw_request());
        assert!(v.highlight_tokens().is_none());
    }

    #[test]
    fn test_first_pass_sets_padding_and_requests_relayout() {
        let mut v = view("a\nb", ScrollFrame::with_size(100.0, 100.0));
        let layout = layout_of(&v);
        let report = v.draw(&layout, &mut RecordingCanvas::new());
        assert!(report.padding_changed);
        assert!((v.left_padding() - 30.0).abs() < f32::EPSILON);
        assert!(v.take_redraw_request());

        let report = v.draw(&layout, &mut RecordingCanvas::new());
        assert!(!report.padding_changed);
        assert!(!v.take_redraw_request());
    }

    // ── drawing ────────────────────────────────────────────────────

    #[test]
    fn test_draws_numbers_without_tokens() {
        let mut v = view("ab\ncd", ScrollFrame::with_size(100.0, 100.0));
        let layout = layout_of(&v);
        let mut canvas = RecordingCanvas::new();
        let report = v.draw(&layout, &mut canvas);

        let labels: Vec<_> = canvas.line_numbers().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2"]);
        assert_eq!(canvas.runs().count(), 0);
        assert_eq!(report.untokenized_lines, 2);
    }

    #[test]
    fn test_empty_document_draws_nothing() {
        let mut v = view("", ScrollFrame::with_size(100.0, 100.0));
        let layout = layout_of(&v);
        let mut canvas = RecordingCanvas::new();
        let report = v.draw(&layout, &mut canvas);
        assert!(report.visible.is_none());
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_runs_are_offset_by_gutter_and_top_inset() {
        let mut v = CodeView::builder()
            .storage(TextBuffer::new("ab"))
            .metrics(MonospaceMetrics::new(10.0))
            .scroll_frame(ScrollFrame::with_size(100.0, 100.0))
            .top_inset(5.0)
            .build()
            .unwrap();
        v.update_highlight_tokens(HighlightTokens::uniform(2, KW));
        let layout = layout_of(&v);
        let mut canvas = RecordingCanvas::new();
        v.draw(&layout, &mut canvas);

        let run = canvas.runs().next().unwrap();
        assert!((run.x - 30.0).abs() < f32::EPSILON);
        assert!((run.baseline - 21.0).abs() < f32::EPSILON);
        let label = canvas.line_numbers().next().unwrap();
        assert!((label.baseline - 21.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_horizontal_scroll_limits_the_span() {
        let frame = SharedScrollFrame::new(ScrollFrame::with_size(50.0, 100.0));
        let mut v = CodeView::builder()
            .storage(TextBuffer::new("0123456789abcdefghij"))
            .metrics(MonospaceMetrics::new(10.0))
            .scroll_frame(frame.clone())
            .build()
            .unwrap();
        v.update_highlight_tokens(HighlightTokens::uniform(20, KW));
        let layout = layout_of(&v);
        // First pass settles the padding at 30px ("1" + margin).
        v.draw(&layout, &mut RecordingCanvas::new());

        frame.set(ScrollFrame::with_size(50.0, 100.0).scrolled_to(130.0, 0.0));
        let mut canvas = RecordingCanvas::new();
        v.draw(&layout, &mut canvas);

        let run = canvas.runs().next().unwrap();
        // Text offset 100px -> chars 10..=15 (right edge at 150px, inclusive).
        assert_eq!((run.start, run.end), (10, 16));
        assert!((run.x - 130.0).abs() < f32::EPSILON);
    }

    // ── selection ──────────────────────────────────────────────────

    #[test]
    fn test_hit_test_snaps_to_nearest_boundary() {
        let mut v = view("abc\ndefg", ScrollFrame::with_size(100.0, 100.0));
        let layout = layout_of(&v);
        v.draw(&layout, &mut RecordingCanvas::new());
        // padding 30, line 1 spans y 20..40
        assert_eq!(v.hit_test(&layout, 30.0, 25.0), 4);
        assert_eq!(v.hit_test(&layout, 34.0, 25.0), 4);
        assert_eq!(v.hit_test(&layout, 36.0, 25.0), 5);
        assert_eq!(v.hit_test(&layout, 46.0, 25.0), 6);
        assert_eq!(v.hit_test(&layout, 500.0, 25.0), 8);
        assert_eq!(v.hit_test(&layout, 500.0, 5.0), 3);
    }

    #[test]
    fn test_selection_changed_reports_through_listener() {
        let mut v = view("abc\ndef", ScrollFrame::default());
        let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
        let sink = std::rc::Rc::clone(&seen);
        v.set_cursor_change_listener(move |line: &str, col: usize| {
            *sink.borrow_mut() = Some((line.to_string(), col));
        });

        v.storage_mut().select(6, 6);
        assert!(v.selection_changed());
        assert_eq!(*seen.borrow(), Some(("def".to_string(), 2)));
    }
}
