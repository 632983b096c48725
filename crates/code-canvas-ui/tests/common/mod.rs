use egui_kittest::Harness;
use code_canvas_ui::{App, StartupArgs};
use tempfile::TempDir;

/// Creates a harness showing `text` as `file_name`, with its config in a temp dir.
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn create_harness(file_name: &str, text: &str) -> (Harness<'static, App>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join(file_name);
    std::fs::write(&file, text).unwrap();
    let args = StartupArgs {
        file: Some(file),
        theme: Some("Dark".to_string()),
        config_path: Some(dir.path().join("code-canvas.json")),
    };
    let harness = Harness::builder()
        .with_size(egui::Vec2::new(800.0, 600.0))
        .build_eframe(move |cc| App::new(cc, args).unwrap());
    (harness, dir)
}
