//! egui host for the code canvas: metrics, painter canvas, widget,
//! background highlighting, and the viewer application.

mod app;
pub mod canvas;
pub mod highlight;
pub mod metrics;
pub mod widget;

pub use app::{App, CaretStatus, StartupArgs, ThemeMode};
pub use canvas::EguiCanvas;
pub use highlight::{HighlightRequest, HighlightWorker, SyntaxHighlighter};
pub use metrics::EguiMetrics;
pub use widget::CodeCanvasWidget;
