//! The code canvas widget: layout, scrolling, clicks, and painting.
//!
//! Each frame the widget refreshes the shared scroll frame from egui input,
//! builds a uniform line layout over the current text and lets the
//! `CodeView` draw the visible lines through an [`EguiCanvas`].

use code_canvas_config::CanvasColors;
use code_canvas_core::{
    CodeView, DrawReport, LineLayout, SharedScrollFrame, TextSnapshot, UniformLineLayout,
};
use egui::{FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};

use crate::canvas::{hex_to_color32, EguiCanvas};
use crate::metrics::EguiMetrics;

/// Longest line of `text`, in chars, excluding line breaks.
pub fn longest_line_chars(text: &TextSnapshot) -> usize {
    text.rope()
        .lines()
        .map(|line| {
            let n = line.len_chars();
            if n > 0 && line.char(n - 1) == '\n' {
                n - 1
            } else {
                n
            }
        })
        .max()
        .unwrap_or(0)
}

/// Renders a [`CodeView`] into the available space.
pub struct CodeCanvasWidget<'a> {
    pub view: &'a mut CodeView,
    pub frame: &'a SharedScrollFrame,
    pub colors: &'a CanvasColors,
    pub font_id: FontId,
    pub line_height: f32,
    /// Longest line in chars, sets the horizontal scroll extent.
    pub max_line_chars: usize,
    /// Outcome of the last `show()` pass.
    pub report: Option<DrawReport>,
}

impl<'a> CodeCanvasWidget<'a> {
    pub fn new(
        view: &'a mut CodeView,
        frame: &'a SharedScrollFrame,
        colors: &'a CanvasColors,
        font_id: FontId,
        line_height: f32,
    ) -> Self {
        Self {
            view,
            frame,
            colors,
            font_id,
            line_height,
            max_line_chars: 0,
            report: None,
        }
    }

    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click());
        let rect = response.rect;

        let row_height = EguiMetrics::new(ui.ctx().clone(), self.font_id.clone()).row_height();
        let descent = ((self.line_height - row_height) / 2.0).max(0.0);
        let text = self.view.storage().text();
        let layout = UniformLineLayout::new(text.clone(), self.line_height, descent);

        let padding = self.view.left_padding();
        let top_inset = self.view.top_inset();
        let char_width = self.view.metrics().measure_str("M");
        let content_width = padding + self.max_line_chars as f32 * char_width;
        let content_height = top_inset + layout.line_count() as f32 * self.line_height;

        // Scroll state lives in the shared frame so the view reads the same values.
        let mut frame = self.frame.get();
        frame.width = rect.width();
        frame.height = rect.height();
        if response.hovered() {
            let delta = ui.input(|i| i.smooth_scroll_delta);
            frame.scroll_x -= delta.x;
            frame.scroll_y -= delta.y;
        }
        let max_scroll_y = (content_height - self.line_height).max(0.0);
        let max_scroll_x = (content_width - rect.width()).max(0.0);
        frame.scroll_y = frame.scroll_y.clamp(0.0, max_scroll_y);
        frame.scroll_x = frame.scroll_x.clamp(0.0, max_scroll_x);
        self.frame.set(frame);
        let scroll = Vec2::new(frame.real_scroll_x(), frame.real_scroll_y());

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if pos.x >= rect.min.x + padding {
                    let x = pos.x - rect.min.x + scroll.x;
                    let y = pos.y - rect.min.y + scroll.y;
                    let index = self.view.hit_test(&layout, x, y);
                    self.view
                        .set_selection(isize::try_from(index).unwrap_or(isize::MAX));
                }
            }
        }

        painter.rect_filled(rect, 0.0, hex_to_color32(self.colors.background));
        let gutter_rect = Rect::from_min_max(rect.min, Pos2::new(rect.min.x + padding, rect.max.y));
        painter.rect_filled(gutter_rect, 0.0, hex_to_color32(self.colors.gutter_background));
        painter.line_segment(
            [
                Pos2::new(gutter_rect.max.x, rect.min.y),
                Pos2::new(gutter_rect.max.x, rect.max.y),
            ],
            Stroke::new(1.0, hex_to_color32(self.colors.gutter_separator)),
        );
        let text_rect = Rect::from_min_max(Pos2::new(gutter_rect.max.x, rect.min.y), rect.max);

        let mut canvas =
            EguiCanvas::new(&painter, gutter_rect, text_rect, rect.min, scroll, &self.font_id);
        let report = self.view.draw(&layout, &mut canvas);
        self.paint_caret(&painter, &layout, &text, rect.min, text_rect, scroll);

        if self.view.take_redraw_request() {
            ui.ctx().request_repaint();
        }
        self.report = Some(report);
        response
    }

    fn paint_caret(
        &self,
        painter: &egui::Painter,
        layout: &UniformLineLayout,
        text: &TextSnapshot,
        origin: Pos2,
        text_rect: Rect,
        scroll: Vec2,
    ) {
        let (start, end) = self.view.storage().selection();
        if start != end || layout.line_count() == 0 {
            return;
        }
        let caret = start.min(text.len_chars());
        let line = text.rope().char_to_line(caret).min(layout.line_count() - 1);
        let offset = self
            .view
            .metrics()
            .measure_range(text, layout.line_start(line), caret);

        let x = origin.x + self.view.left_padding() + offset - scroll.x;
        let top = origin.y + self.view.top_inset() + layout.line_top(line) - scroll.y;
        painter.with_clip_rect(text_rect).line_segment(
            [Pos2::new(x, top), Pos2::new(x, top + self.line_height)],
            Stroke::new(2.0, hex_to_color32(self.colors.caret)),
        );
    }
}
