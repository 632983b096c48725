//! `Canvas` implementation that paints through an `egui::Painter`.

use code_canvas_core::{Canvas, HexColor, LineNumberLabel, TextRun};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Vec2};

use crate::metrics::display_text;

/// Converts a `HexColor` to egui `Color32`.
pub(crate) fn hex_to_color32(c: HexColor) -> Color32 {
    Color32::from_rgba_premultiplied(c.r, c.g, c.b, c.a)
}

/// Maps content coordinates to the screen.
///
/// Code scrolls both ways. The gutter only follows vertical scrolling so
/// line numbers stay pinned to the left edge.
pub struct EguiCanvas<'a> {
    text_painter: Painter,
    gutter_painter: Painter,
    /// Screen position of content coordinate `(0, 0)`.
    origin: Pos2,
    scroll: Vec2,
    font_id: &'a FontId,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(
        painter: &Painter,
        gutter_rect: Rect,
        text_rect: Rect,
        origin: Pos2,
        scroll: Vec2,
        font_id: &'a FontId,
    ) -> Self {
        Self {
            text_painter: painter.with_clip_rect(text_rect),
            gutter_painter: painter.with_clip_rect(gutter_rect),
            origin,
            scroll,
            font_id,
        }
    }

    fn paint_run(&self, run: &TextRun) {
        let pos = self.origin + Vec2::new(run.x, run.baseline) - self.scroll;
        self.text_painter.text(
            pos,
            Align2::LEFT_BOTTOM,
            display_text(&run.text),
            self.font_id.clone(),
            hex_to_color32(run.color),
        );
    }
}

impl Canvas for EguiCanvas<'_> {
    fn draw_run(&mut self, run: &TextRun) {
        self.paint_run(run);
    }

    fn draw_line_number(&mut self, label: &LineNumberLabel) {
        let pos = self.origin + Vec2::new(label.x, label.baseline - self.scroll.y);
        self.gutter_painter.text(
            pos,
            Align2::LEFT_BOTTOM,
            &label.label,
            self.font_id.clone(),
            hex_to_color32(label.color),
        );
    }

    fn draw_fallback(&mut self, run: &TextRun) {
        self.paint_run(run);
    }
}
