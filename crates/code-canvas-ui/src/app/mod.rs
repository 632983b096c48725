//! Viewer application: one code canvas, a status bar, and theme handling.

mod status_bar;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use eframe::egui;
use egui::FontId;

use code_canvas_config::{CanvasColors, CanvasConfig, ThemeDefinition};
use code_canvas_core::{
    CodeView, CodeViewBuilder, SharedScrollFrame, TextBuffer, TextSnapshot, Theme,
};

use crate::highlight::{HighlightRequest, HighlightWorker};
use crate::metrics::EguiMetrics;
use crate::widget::{longest_line_chars, CodeCanvasWidget};

/// Arguments passed from the command line to the application.
#[derive(Debug, Clone, Default)]
pub struct StartupArgs {
    /// File to show.
    pub file: Option<PathBuf>,
    /// Theme name overriding the configured one.
    pub theme: Option<String>,
    /// Config file to use instead of the platform default.
    pub config_path: Option<PathBuf>,
}

/// Which color theme to use.
///
/// Wraps a string name. Special values: `"System"`, `"Dark"`, `"Light"`.
/// Any other value refers to a custom theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeMode(pub String);

impl Default for ThemeMode {
    fn default() -> Self {
        Self::system()
    }
}

impl ThemeMode {
    pub fn system() -> Self {
        Self("System".to_string())
    }

    pub fn dark() -> Self {
        Self("Dark".to_string())
    }

    pub fn light() -> Self {
        Self("Light".to_string())
    }

    pub fn is_system(&self) -> bool {
        self.0 == "System"
    }

    /// Resolves "System" to a concrete theme name using the OS preference.
    /// Non-system modes return their own name.
    pub fn resolve(&self) -> &str {
        if self.is_system() {
            match dark_light::detect() {
                Ok(dark_light::Mode::Light) => "Light",
                _ => "Dark",
            }
        } else {
            &self.0
        }
    }
}

/// Caret line and column as last reported by the cursor listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaretStatus {
    pub line: String,
    pub column: usize,
}

/// The main application state.
pub struct App {
    pub view: CodeView,
    pub scroll_frame: SharedScrollFrame,
    pub config: CanvasConfig,
    pub theme_mode: ThemeMode,
    pub theme_def: ThemeDefinition,
    pub file_path: Option<PathBuf>,
    pub caret: Rc<RefCell<CaretStatus>>,
    font_id: FontId,
    max_line_chars: usize,
    worker: Option<HighlightWorker>,
    last_window_title: String,
}

impl App {
    /// Creates the application, loading config and the requested file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read.
    pub fn new(cc: &eframe::CreationContext<'_>, args: StartupArgs) -> Result<Self> {
        let config_path = args
            .config_path
            .clone()
            .unwrap_or_else(CanvasConfig::config_path);
        let config = CanvasConfig::load_or_create(&config_path);

        let text = match &args.file {
            Some(path) => read_source(path)?,
            None => String::new(),
        };

        let requested = args.theme.unwrap_or_else(|| config.current_theme.clone());
        let (theme_mode, theme_def) = resolve_theme(&config, ThemeMode(requested));
        apply_theme_visuals(&cc.egui_ctx, theme_def.dark_mode);

        let font_id = FontId::monospace(config.font_size);
        let scroll_frame = SharedScrollFrame::default();
        let repaint_ctx = cc.egui_ctx.clone();
        let text = TextSnapshot::from(text);
        let max_line_chars = longest_line_chars(&text);

        let mut view = CodeViewBuilder::from_config(&config)
            .storage(TextBuffer::new(text))
            .metrics(EguiMetrics::new(cc.egui_ctx.clone(), font_id.clone()))
            .scroll_frame(scroll_frame.clone())
            .theme(Theme::from(&theme_def.colors))
            .redraw_waker(move || repaint_ctx.request_repaint())
            .build()?;

        let caret = Rc::new(RefCell::new(CaretStatus::default()));
        let sink = Rc::clone(&caret);
        view.set_cursor_change_listener(move |line: &str, column: usize| {
            *sink.borrow_mut() = CaretStatus {
                line: line.to_string(),
                column,
            };
        });
        view.set_selection(0);

        let debounce = Duration::from_millis(config.highlight_debounce_ms);
        let worker = match HighlightWorker::spawn(view.token_publisher(), debounce) {
            Ok(worker) => Some(worker),
            Err(e) => {
                tracing::warn!("Highlighting disabled: {e:#}");
                None
            }
        };

        let app = Self {
            view,
            scroll_frame,
            config,
            theme_mode,
            theme_def,
            file_path: args.file,
            caret,
            font_id,
            max_line_chars,
            worker,
            last_window_title: String::new(),
        };
        app.request_highlight();
        Ok(app)
    }

    /// Queues a highlight pass over the current text.
    pub fn request_highlight(&self) {
        let Some(worker) = &self.worker else {
            return;
        };
        worker.request(HighlightRequest {
            text: self.view.storage().text(),
            file_path: self.file_path.clone(),
            syntax_theme: self.theme_def.syntax_theme.clone(),
            default_color: self.theme_def.colors.text_color,
        });
    }

    /// Switches to a new theme mode and re-highlights with its syntax theme.
    pub fn set_theme_mode(&mut self, mode: ThemeMode, ctx: &egui::Context) {
        let (mode, def) = resolve_theme(&self.config, mode);
        tracing::info!(theme = %def.name, "Switching theme");
        self.theme_mode = mode;
        self.view.set_theme(Theme::from(&def.colors));
        apply_theme_visuals(ctx, def.dark_mode);
        let syntax_changed = def.syntax_theme != self.theme_def.syntax_theme;
        self.theme_def = def;
        if syntax_changed {
            self.request_highlight();
        }
    }

    pub fn canvas_colors(&self) -> &CanvasColors {
        &self.theme_def.colors
    }

    fn update_window_title(&mut self, ctx: &egui::Context) {
        let file_label = self
            .file_path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "Untitled".to_string(), |n| n.to_string_lossy().into_owned());
        let title = format!("{file_label} - code-canvas");
        if title != self.last_window_title {
            self.last_window_title.clone_from(&title);
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    tracing::info!(path = %path.display(), chars = text.chars().count(), "Loaded file");
    Ok(text)
}

/// Finds the theme for `mode`, falling back to System when it doesn't exist.
fn resolve_theme(config: &CanvasConfig, mode: ThemeMode) -> (ThemeMode, ThemeDefinition) {
    if let Some(def) = config.find_theme(mode.resolve()) {
        return (mode.clone(), def.clone());
    }
    tracing::warn!("Theme '{}' not found, falling back to System", mode.0);
    let fallback = ThemeMode::system();
    let def = config
        .find_theme(fallback.resolve())
        .cloned()
        .unwrap_or_else(ThemeDefinition::dark);
    (fallback, def)
}

fn apply_theme_visuals(ctx: &egui::Context, dark_mode: bool) {
    let visuals = if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    ctx.set_visuals(visuals);
}

impl eframe::App for App {
    // Required by eframe 0.34; rendering is driven by `update`, which eframe still calls before `ui`.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_window_title(ctx);

        let extreme_bg = ctx.style().visuals.extreme_bg_color;
        egui::TopBottomPanel::bottom("status_bar")
            .max_height(24.0)
            .frame(
                egui::Frame::new()
                    .fill(extreme_bg)
                    .inner_margin(egui::Margin::symmetric(8, 3)),
            )
            .show(ctx, |ui| {
                self.show_status_bar(ui);
            });

        let bg = crate::canvas::hex_to_color32(self.theme_def.colors.background);
        let line_height = self.config.line_height();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(bg))
            .show(ctx, |ui| {
                let mut widget = CodeCanvasWidget::new(
                    &mut self.view,
                    &self.scroll_frame,
                    &self.theme_def.colors,
                    self.font_id.clone(),
                    line_height,
                );
                widget.max_line_chars = self.max_line_chars;
                widget.show(ui);
            });
    }
}
