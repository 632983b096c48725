//! Status bar: caret line and column, document size, highlight state, theme.

use eframe::egui;

use super::App;

/// Longest caret-line preview shown in the status bar, in chars.
const LINE_PREVIEW_CHARS: usize = 60;

/// Shortens `line` for display, marking the cut with an ellipsis.
fn preview(line: &str) -> String {
    let trimmed = line.trim_end_matches('\r');
    if trimmed.chars().count() <= LINE_PREVIEW_CHARS {
        trimmed.to_string()
    } else {
        let mut cut: String = trimmed.chars().take(LINE_PREVIEW_CHARS).collect();
        cut.push('…');
        cut
    }
}

/// Describes the published tokens relative to the current text.
fn highlight_state(tokens: Option<usize>, text_len: usize) -> &'static str {
    match tokens {
        None => "Plain",
        Some(len) if len == text_len => "Highlighted",
        Some(_) => "Highlighting…",
    }
}

impl App {
    /// Renders the status bar at the bottom of the application window.
    pub(crate) fn show_status_bar(&mut self, ui: &mut egui::Ui) {
        let caret = self.caret.borrow().clone();
        let text = self.view.storage().text();
        let line_count = text.len_lines();
        let char_count = text.len_chars();
        let tokens = self.view.highlight_tokens().map(|t| t.len());
        let scroll_y = self.view.scroll_frame().real_scroll_y().max(0.0);

        ui.horizontal(|ui| {
            ui.add(egui::Label::new(format!("Col {}", caret.column + 1)).selectable(false));
            ui.separator();
            ui.add(
                egui::Label::new(egui::RichText::new(preview(&caret.line)).monospace())
                    .selectable(false)
                    .truncate(),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_label = if self.theme_mode.is_system() {
                    format!("System ({})", self.theme_def.name)
                } else {
                    self.theme_def.name.clone()
                };
                ui.add(egui::Label::new(theme_label).selectable(false));
                ui.separator();
                ui.add(
                    egui::Label::new(highlight_state(tokens, char_count)).selectable(false),
                );
                ui.separator();
                ui.add(
                    egui::Label::new(format!("{line_count} lines, {char_count} chars"))
                        .selectable(false),
                );
                ui.separator();
                ui.add(egui::Label::new(format!("y {scroll_y:.0}px")).selectable(false));
            });
        });
    }
}
