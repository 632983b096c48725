//! Text measurement through egui's font system.

use std::borrow::Cow;

use code_canvas_core::TextMetrics;
use egui::{text::LayoutJob, FontId, TextFormat};

/// Tabs are drawn and measured as single spaces.
pub(crate) fn display_text(text: &str) -> Cow<'_, str> {
    if text.contains('\t') {
        Cow::Owned(text.replace('\t', " "))
    } else {
        Cow::Borrowed(text)
    }
}

/// Measures strings with the fonts of an `egui::Context`.
///
/// Only valid while the context has fonts, i.e. inside a frame.
#[derive(Clone)]
pub struct EguiMetrics {
    ctx: egui::Context,
    font_id: FontId,
}

impl EguiMetrics {
    pub fn new(ctx: egui::Context, font_id: FontId) -> Self {
        Self { ctx, font_id }
    }

    /// Height of one row of text in this font.
    pub fn row_height(&self) -> f32 {
        self.layout("M").rect.height()
    }

    fn layout(&self, text: &str) -> std::sync::Arc<egui::Galley> {
        let mut job = LayoutJob::default();
        job.append(
            &display_text(text),
            0.0,
            TextFormat {
                font_id: self.font_id.clone(),
                ..Default::default()
            },
        );
        self.ctx.fonts_mut(|f| f.layout_job(job))
    }
}

impl std::fmt::Debug for EguiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EguiMetrics")
            .field("font_id", &self.font_id)
            .finish_non_exhaustive()
    }
}

impl TextMetrics for EguiMetrics {
    fn measure_str(&self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.layout(text).rect.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_replaces_tabs_only_when_present() {
        assert!(matches!(display_text("abc"), Cow::Borrowed("abc")));
        assert_eq!(display_text("\tx\t"), " x ");
    }
}
