//! Viewport-aware, syntax-colored code rendering.
//!
//! Only the lines inside the scroll viewport are drawn, and only the
//! horizontally visible part of each line. Colors come from a
//! [`HighlightTokens`] snapshot that a background highlighter publishes
//! while the UI thread keeps drawing.

pub mod canvas;
pub mod cursor;
pub mod gutter;
pub mod layout;
pub mod metrics;
pub mod runs;
pub mod search;
pub mod text;
pub mod tokens;
pub mod view;
pub mod viewport;

pub use canvas::{Canvas, DrawOp, LineNumberLabel, RecordingCanvas, TextRun};
pub use cursor::{CursorChangeListener, CursorLineNotifier};
pub use gutter::GutterLayout;
pub use layout::{LineGeometry, LineLayout, UniformLineLayout};
pub use metrics::{MonospaceMetrics, TextMetrics};
pub use text::{TextBuffer, TextSnapshot, TextStorage};
pub use tokens::{HighlightTokens, RedrawSignal, TokenPublisher, TokenSlot};
pub use view::{CodeView, CodeViewBuilder, DrawReport, Theme};
pub use viewport::{ScrollFrame, ScrollFrameProvider, SharedScrollFrame, VisibleLineRange};

pub use code_canvas_config::HexColor;
