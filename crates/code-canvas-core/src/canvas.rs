/// Draw targets for the renderer.
use code_canvas_config::HexColor;

/// A single-colored piece of one line, positioned in content coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub line: usize,
    /// Char range of the run in the text snapshot.
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub color: HexColor,
}

/// A gutter label. `x` is the left edge of the label.
#[derive(Debug, Clone, PartialEq)]
pub struct LineNumberLabel {
    pub line: usize,
    pub label: String,
    pub x: f32,
    pub baseline: f32,
    pub color: HexColor,
}

/// Receives the draw operations of a pass.
pub trait Canvas {
    fn draw_run(&mut self, run: &TextRun);

    fn draw_line_number(&mut self, label: &LineNumberLabel);

    /// Plain text for spans that have no usable highlight tokens.
    /// Hosts that render text themselves can ignore it.
    fn draw_fallback(&mut self, _run: &TextRun) {}
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn draw_run(&mut self, run: &TextRun) {
        (**self).draw_run(run)
    }

    fn draw_line_number(&mut self, label: &LineNumberLabel) {
        (**self).draw_line_number(label)
    }

    fn draw_fallback(&mut self, run: &TextRun) {
        (**self).draw_fallback(run)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Run(TextRun),
    LineNumber(LineNumberLabel),
    Fallback(TextRun),
}

/// Canvas that records every operation, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colored runs, in draw order.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Run(run) => Some(run),
            _ => None,
        })
    }

    pub fn runs_for_line(&self, line: usize) -> Vec<&TextRun> {
        self.runs().filter(|run| run.line == line).collect()
    }

    pub fn line_numbers(&self) -> impl Iterator<Item = &LineNumberLabel> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::LineNumber(label) => Some(label),
            _ => None,
        })
    }

    pub fn fallbacks(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fallback(run) => Some(run),
            _ => None,
        })
    }

    /// Whether any operation touched `line`.
    pub fn touches_line(&self, line: usize) -> bool {
        self.ops.iter().any(|op| match op {
            DrawOp::Run(run) | DrawOp::Fallback(run) => run.line == line,
            DrawOp::LineNumber(label) => label.line == line,
        })
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn draw_run(&mut self, run: &TextRun) {
        self.ops.push(DrawOp::Run(run.clone()));
    }

    fn draw_line_number(&mut self, label: &LineNumberLabel) {
        self.ops.push(DrawOp::LineNumber(label.clone()));
    }

    fn draw_fallback(&mut self, run: &TextRun) {
        self.ops.push(DrawOp::Fallback(run.clone()));
    }
}
