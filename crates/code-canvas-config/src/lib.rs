pub mod color;
pub mod config;
pub mod theme;

pub use color::HexColor;
pub use config::CanvasConfig;
pub use theme::{CanvasColors, ThemeDefinition};
