//! Syntax highlighting with syntect, producing per-character token colors.

mod worker;

pub use worker::{HighlightRequest, HighlightWorker};

use std::path::Path;

use code_canvas_core::{HexColor, HighlightTokens, TextSnapshot};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Syntect syntax and theme sets plus the active theme.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    current_theme: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            current_theme: "base16-eighties.dark".to_string(),
        }
    }

    /// Picks a syntax by the file's extension, then by its whole file name
    /// (`Makefile`), falling back to plain text.
    pub fn detect_syntax(&self, file_path: Option<&Path>) -> &SyntaxReference {
        let candidates = file_path
            .into_iter()
            .flat_map(|p| [p.extension(), p.file_name()])
            .flatten()
            .filter_map(|s| s.to_str());
        for candidate in candidates {
            if let Some(syntax) = self.syntax_set.find_syntax_by_extension(candidate) {
                return syntax;
            }
        }
        self.syntax_set.find_syntax_plain_text()
    }

    /// Colors every character of `text`.
    ///
    /// Characters the highlighter cannot style keep `default`. The result
    /// has exactly `text.len_chars()` entries.
    pub fn tokens_for(
        &self,
        text: &TextSnapshot,
        file_path: Option<&Path>,
        default: HexColor,
    ) -> HighlightTokens {
        let len = text.len_chars();
        let syntax = self.detect_syntax(file_path);
        let Some(theme) = self.theme_set.themes.get(&self.current_theme) else {
            tracing::warn!(theme = %self.current_theme, "syntax theme missing");
            return HighlightTokens::uniform(len, default);
        };
        let mut highlighter = HighlightLines::new(syntax, theme);

        let source = text.to_string();
        let mut colors = Vec::with_capacity(len);
        for line in LinesWithEndings::from(&source) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    for (style, piece) in ranges {
                        let color = style_color(style);
                        colors.extend(std::iter::repeat_n(color, piece.chars().count()));
                    }
                }
                Err(err) => {
                    tracing::debug!("highlight failed, line left plain: {err}");
                    colors.extend(std::iter::repeat_n(default, line.chars().count()));
                }
            }
        }
        colors.resize(len, default);
        HighlightTokens::new(colors)
    }

    /// Returns a list of available theme names.
    pub fn available_themes(&self) -> Vec<&str> {
        self.theme_set.themes.keys().map(|s| s.as_str()).collect()
    }

    /// Sets the current theme. Unknown names are ignored.
    pub fn set_theme(&mut self, theme_name: &str) {
        if self.theme_set.themes.contains_key(theme_name) {
            self.current_theme = theme_name.to_string();
        } else {
            tracing::warn!("Unknown syntax theme '{theme_name}', keeping '{}'", self.current_theme);
        }
    }

    pub fn current_theme(&self) -> &str {
        &self.current_theme
    }
}

/// Converts a syntect foreground to a `HexColor`.
fn style_color(style: Style) -> HexColor {
    let fg = style.foreground;
    HexColor::rgba(fg.r, fg.g, fg.b, fg.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: HexColor = HexColor::rgb(1, 2, 3);

    // ── syntax detection ───────────────────────────────────────────

    #[test]
    fn test_syntax_is_detected_from_path() {
        let highlighter = SyntaxHighlighter::new();
        let cases = [
            (Some("src/main.rs"), "Rust"),
            (Some("tools/build.py"), "Python"),
            (Some("Makefile"), "Makefile"),
            (Some("notes.unknown_ext"), "Plain Text"),
            (None, "Plain Text"),
        ];
        for (path, expected) in cases {
            let syntax = highlighter.detect_syntax(path.map(Path::new));
            assert_eq!(syntax.name, expected, "path {path:?}");
        }
    }

    // ── themes ─────────────────────────────────────────────────────

    #[test]
    fn test_unknown_syntax_theme_keeps_the_current_one() {
        let mut highlighter = SyntaxHighlighter::default();
        highlighter.set_theme("no-such-theme");
        assert_eq!(highlighter.current_theme(), "base16-eighties.dark");

        highlighter.set_theme("InspiredGitHub");
        assert_eq!(highlighter.current_theme(), "InspiredGitHub");
        assert!(highlighter.available_themes().len() > 1);
    }

    // ── tokens ─────────────────────────────────────────────────────

    #[test]
    fn test_tokens_cover_every_char() {
        let hl = SyntaxHighlighter::default();
        let text = TextSnapshot::from("fn main() {\n    let é = 1;\n}\n");
        let tokens = hl.tokens_for(&text, Some(Path::new("main.rs")), PLAIN);
        assert_eq!(tokens.len(), text.len_chars());
    }

    #[test]
    fn test_keyword_differs_from_identifier() {
        let hl = SyntaxHighlighter::default();
        let text = TextSnapshot::from("fn main() {}");
        let tokens = hl.tokens_for(&text, Some(Path::new("main.rs")), PLAIN);
        assert_eq!(tokens.char_color(0), tokens.char_color(1));
        assert_ne!(tokens.char_color(0), tokens.char_color(3));
    }

    #[test]
    fn test_empty_text_gives_empty_tokens() {
        let hl = SyntaxHighlighter::default();
        let tokens = hl.tokens_for(&TextSnapshot::default(), None, PLAIN);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_style_color_conversion() {
        let mut style = Style::default();
        style.foreground = syntect::highlighting::Color { r: 9, g: 90, b: 180, a: 255 };
        assert_eq!(style_color(style), HexColor::rgb(9, 90, 180));
    }
}
