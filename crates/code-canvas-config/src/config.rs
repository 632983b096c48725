/// Renderer configuration: load, save, merge, and sanitize.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::theme::ThemeDefinition;

const CONFIG_FILE_NAME: &str = "code-canvas.json";

/// Top-level renderer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// `"System"`, `"Dark"`, `"Light"` or the name of a custom theme.
    pub current_theme: String,
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
    /// Fixed margin added to the width of the widest line number.
    pub gutter_margin: f32,
    /// Distance from the left edge to the widest line-number label.
    pub gutter_label_inset: f32,
    /// Non-scrollable padding above the first line.
    pub top_inset: f32,
    /// Quiet period before a queued highlight request is processed.
    pub highlight_debounce_ms: u64,
    pub themes: Vec<ThemeDefinition>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            current_theme: "System".to_string(),
            font_size: 14.0,
            line_height_factor: 1.4,
            gutter_margin: 20.0,
            gutter_label_inset: 10.0,
            top_inset: 0.0,
            highlight_debounce_ms: 150,
            themes: vec![ThemeDefinition::dark(), ThemeDefinition::light()],
        }
    }
}

impl CanvasConfig {
    /// Returns the config file path: platform config dir + `code-canvas/code-canvas.json`.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("code-canvas").join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any read or parse error.
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            return config;
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                // Leave the broken file alone so the user can fix it.
                tracing::warn!("Falling back to default config: {e:#}");
                let mut config = Self::default();
                config.sanitize();
                config
            }
        }
    }

    /// Loads and sanitizes config from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let mut config: CanvasConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config.sanitize();
        config.with_builtins_merged();
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config at {}", path.display()))
    }

    /// Ensures built-in Dark and Light themes are always present.
    /// User-defined themes with matching names take priority over built-ins.
    pub fn with_builtins_merged(&mut self) {
        if self.find_theme("Dark").is_none() {
            self.themes.insert(0, ThemeDefinition::dark());
        }
        if self.find_theme("Light").is_none() {
            let insert_at = 1.min(self.themes.len());
            self.themes.insert(insert_at, ThemeDefinition::light());
        }
    }

    /// Finds a theme by name.
    pub fn find_theme(&self, name: &str) -> Option<&ThemeDefinition> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Returns all theme names.
    pub fn theme_names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    /// Line height in pixels for the configured font size.
    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_height_factor
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.font_size = finite_or(self.font_size, 14.0).clamp(6.0, 72.0);
        self.line_height_factor = finite_or(self.line_height_factor, 1.4).clamp(1.0, 3.0);
        self.gutter_margin = finite_or(self.gutter_margin, 20.0).max(0.0);
        self.gutter_label_inset = finite_or(self.gutter_label_inset, 10.0)
            .clamp(0.0, self.gutter_margin);
        self.top_inset = finite_or(self.top_inset, 0.0).max(0.0);
        self.highlight_debounce_ms = self.highlight_debounce_ms.min(5_000);

        let builtin_modes = ["System", "Dark", "Light"];
        if !builtin_modes.contains(&self.current_theme.as_str())
            && self.find_theme(&self.current_theme).is_none()
        {
            self.current_theme = "System".to_string();
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert_eq!(config.current_theme, "System");
        assert!((config.font_size - 14.0).abs() < f32::EPSILON);
        assert!((config.gutter_margin - 20.0).abs() < f32::EPSILON);
        assert!((config.gutter_label_inset - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.themes.len(), 2);
    }

    #[test]
    fn test_line_height_scales_with_font() {
        let mut config = CanvasConfig::default();
        config.font_size = 10.0;
        config.line_height_factor = 2.0;
        assert!((config.line_height() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sanitize_clamps_font_size() {
        let mut config = CanvasConfig::default();
        config.font_size = 2.0;
        config.sanitize();
        assert!((config.font_size - 6.0).abs() < f32::EPSILON);

        config.font_size = 100.0;
        config.sanitize();
        assert!((config.font_size - 72.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sanitize_replaces_non_finite_values() {
        let mut config = CanvasConfig::default();
        config.gutter_margin = f32::NAN;
        config.top_inset = f32::INFINITY;
        config.sanitize();
        assert!((config.gutter_margin - 20.0).abs() < f32::EPSILON);
        assert!(config.top_inset.abs() < f32::EPSILON);
    }

    #[test]
    fn test_sanitize_keeps_label_inside_margin() {
        let mut config = CanvasConfig::default();
        config.gutter_margin = 4.0;
        config.gutter_label_inset = 10.0;
        config.sanitize();
        assert!((config.gutter_label_inset - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sanitize_caps_debounce() {
        let mut config = CanvasConfig::default();
        config.highlight_debounce_ms = 60_000;
        config.sanitize();
        assert_eq!(config.highlight_debounce_ms, 5_000);
    }

    #[test]
    fn test_sanitize_resets_unknown_theme() {
        let mut config = CanvasConfig::default();
        config.current_theme = "NonExistent".to_string();
        config.sanitize();
        assert_eq!(config.current_theme, "System");
    }

    #[test]
    fn test_sanitize_allows_custom_theme_name() {
        let mut config = CanvasConfig::default();
        let mut custom = ThemeDefinition::dark();
        custom.name = "Midnight".to_string();
        config.themes.push(custom);
        config.current_theme = "Midnight".to_string();
        config.sanitize();
        assert_eq!(config.current_theme, "Midnight");
    }

    #[test]
    fn test_theme_names() {
        let config = CanvasConfig::default();
        assert_eq!(config.theme_names(), vec!["Dark", "Light"]);
    }

    #[test]
    fn test_with_builtins_merged_adds_missing() {
        let mut config = CanvasConfig::default();
        config.themes.clear();
        config.with_builtins_merged();
        assert_eq!(config.theme_names(), vec!["Dark", "Light"]);
    }

    #[test]
    fn test_with_builtins_merged_preserves_custom() {
        let mut custom_dark = ThemeDefinition::dark();
        custom_dark.colors.line_number_color = crate::HexColor::rgb(255, 0, 0);

        let mut config = CanvasConfig::default();
        config.themes = vec![custom_dark];
        config.with_builtins_merged();

        let dark = config.find_theme("Dark").unwrap();
        assert_eq!(dark.colors.line_number_color, crate::HexColor::rgb(255, 0, 0));
        assert!(config.find_theme("Light").is_some());
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let parsed: CanvasConfig = serde_json::from_str(r#"{"current_theme": "Dark"}"#).unwrap();
        assert_eq!(parsed.current_theme, "Dark");
        assert_eq!(parsed.highlight_debounce_ms, 150);
        assert!((parsed.line_height_factor - 1.4).abs() < f32::EPSILON);
    }
}
