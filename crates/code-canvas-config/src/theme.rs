//! Color themes for the code canvas and the two presets that always exist.
use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Colors painted by the canvas itself. Token colors come from the
/// syntect theme named in [`ThemeDefinition::syntax_theme`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasColors {
    pub background: HexColor,
    /// Color of code that has no highlight token yet.
    pub text_color: HexColor,
    pub caret: HexColor,
    pub line_number_color: HexColor,
    pub gutter_background: HexColor,
    pub gutter_separator: HexColor,
}

impl Default for CanvasColors {
    fn default() -> Self {
        Self::dark()
    }
}

impl CanvasColors {
    fn dark() -> Self {
        Self {
            background: HexColor::rgb(0x2d, 0x2d, 0x2d),
            text_color: HexColor::rgb(0xd3, 0xd0, 0xc8),
            caret: HexColor::rgb(0xf2, 0xf0, 0xec),
            line_number_color: HexColor::rgb(0x74, 0x73, 0x69),
            gutter_background: HexColor::rgb(0x26, 0x26, 0x26),
            gutter_separator: HexColor::rgb(0x39, 0x39, 0x39),
        }
    }

    fn light() -> Self {
        Self {
            background: HexColor::rgb(0xff, 0xff, 0xff),
            text_color: HexColor::rgb(0x32, 0x32, 0x32),
            caret: HexColor::rgb(0x10, 0x10, 0x10),
            line_number_color: HexColor::rgb(0x96, 0x98, 0x96),
            gutter_background: HexColor::rgb(0xf5, 0xf5, 0xf5),
            gutter_separator: HexColor::rgb(0xdd, 0xdd, 0xdd),
        }
    }
}

/// A named theme: UI mode, syntect theme and canvas colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    pub name: String,
    pub dark_mode: bool,
    #[serde(default = "dark_syntax_theme")]
    pub syntax_theme: String,
    #[serde(default)]
    pub colors: CanvasColors,
}

fn dark_syntax_theme() -> String {
    "base16-eighties.dark".to_string()
}

impl ThemeDefinition {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            dark_mode: true,
            syntax_theme: dark_syntax_theme(),
            colors: CanvasColors::dark(),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            dark_mode: false,
            syntax_theme: "InspiredGitHub".to_string(),
            colors: CanvasColors::light(),
        }
    }

    /// Whether this is one of the presets merged into every config.
    pub fn is_builtin(&self) -> bool {
        matches!(self.name.as_str(), "Dark" | "Light")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_round_trip_through_json() {
        for theme in [ThemeDefinition::dark(), ThemeDefinition::light()] {
            let json = serde_json::to_string_pretty(&theme).unwrap();
            let parsed: ThemeDefinition = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, theme);
            assert!(parsed.is_builtin());
        }
    }

    #[test]
    fn test_missing_colors_come_from_the_dark_preset() {
        let colors: CanvasColors =
            serde_json::from_str(r##"{"caret": "#FF8800"}"##).unwrap();
        assert_eq!(colors.caret, HexColor::rgb(255, 136, 0));
        assert_eq!(colors.gutter_background, CanvasColors::dark().gutter_background);
    }

    #[test]
    fn test_name_and_mode_are_enough() {
        let theme: ThemeDefinition =
            serde_json::from_str(r#"{"name": "Ink", "dark_mode": false}"#).unwrap();
        assert!(!theme.is_builtin());
        assert_eq!(theme.syntax_theme, "base16-eighties.dark");
        assert_eq!(theme.colors, CanvasColors::default());
    }
}
