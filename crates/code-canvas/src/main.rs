#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// A syntax-colored code viewer that only draws what is on screen.
#[derive(Parser, Debug)]
#[command(name = "code-canvas", version, about)]
struct Cli {
    /// File to open.
    file: Option<PathBuf>,

    /// Theme to use: System, Dark, Light, or a custom theme name.
    #[arg(long)]
    theme: Option<String>,

    /// Config file to use instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting code-canvas");

    let startup_args = code_canvas_ui::StartupArgs {
        file: cli.file,
        theme: cli.theme,
        config_path: cli.config,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([320.0, 200.0]),
        ..Default::default()
    };

    eframe::run_native(
        "code-canvas",
        native_options,
        Box::new(move |cc| Ok(Box::new(code_canvas_ui::App::new(cc, startup_args)?))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
