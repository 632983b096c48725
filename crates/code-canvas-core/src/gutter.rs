//! Line-number gutter layout.

use code_canvas_config::HexColor;

use crate::canvas::LineNumberLabel;
use crate::metrics::TextMetrics;

/// Left padding reserved for line numbers, derived from the line count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterLayout {
    /// Fixed margin added to the width of the widest label.
    pub margin: f32,
    /// Left edge of the widest label. Narrower labels are right-aligned to it.
    pub label_inset: f32,
}

impl Default for GutterLayout {
    fn default() -> Self {
        Self {
            margin: 20.0,
            label_inset: 10.0,
        }
    }
}

impl GutterLayout {
    pub fn new(margin: f32, label_inset: f32) -> Self {
        Self {
            margin,
            label_inset,
        }
    }

    /// Width of the decimal line count plus the fixed margin.
    pub fn compute_padding<M: TextMetrics + ?Sized>(&self, line_count: usize, metrics: &M) -> f32 {
        metrics.measure_str(&line_count.to_string()) + self.margin
    }

    /// Recomputes the padding and writes it to `current` only if it changed.
    ///
    /// Returns `true` when the host has to relayout. The width only changes
    /// with the digit count, so most frames leave the padding untouched.
    pub fn apply<M: TextMetrics + ?Sized>(
        &self,
        current: &mut f32,
        line_count: usize,
        metrics: &M,
    ) -> bool {
        let padding = self.compute_padding(line_count, metrics);
        if (padding - *current).abs() > f32::EPSILON {
            tracing::debug!(from = *current, to = padding, line_count, "gutter padding changed");
            *current = padding;
            true
        } else {
            false
        }
    }

    /// The 1-based label for `line`, right-aligned inside `padding`.
    pub fn label<M: TextMetrics + ?Sized>(
        &self,
        line: usize,
        padding: f32,
        baseline: f32,
        metrics: &M,
        color: HexColor,
    ) -> LineNumberLabel {
        let label = (line + 1).to_string();
        let right_edge = padding - (self.margin - self.label_inset);
        let x = (right_edge - metrics.measure_str(&label)).max(0.0);
        LineNumberLabel {
            line,
            label,
            x,
            baseline,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MonospaceMetrics;

    const GREY: HexColor = HexColor::rgb(120, 120, 120);

    #[test]
    fn test_padding_is_digit_width_plus_margin() {
        let g = GutterLayout::default();
        let m = MonospaceMetrics::new(8.0);
        assert!((g.compute_padding(7, &m) - 28.0).abs() < f32::EPSILON);
        assert!((g.compute_padding(1234, &m) - 52.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_padding_changes_only_with_digit_count() {
        let g = GutterLayout::default();
        let m = MonospaceMetrics::new(8.0);
        let mut padding = 0.0;

        assert!(g.apply(&mut padding, 9, &m));
        assert!(!g.apply(&mut padding, 9, &m));
        assert!(g.apply(&mut padding, 10, &m));
        assert!(!g.apply(&mut padding, 11, &m));
        assert!(!g.apply(&mut padding, 99, &m));
        assert!(g.apply(&mut padding, 100, &m));
        assert!(g.apply(&mut padding, 5, &m));
    }

    #[test]
    fn test_labels_are_one_based_and_right_aligned() {
        let g = GutterLayout::default();
        let m = MonospaceMetrics::new(8.0);
        let padding = g.compute_padding(120, &m);

        let widest = g.label(119, padding, 16.0, &m, GREY);
        assert_eq!(widest.label, "120");
        assert!((widest.x - 10.0).abs() < f32::EPSILON);

        let narrow = g.label(0, padding, 16.0, &m, GREY);
        assert_eq!(narrow.label, "1");
        assert!((narrow.x - 26.0).abs() < f32::EPSILON);
        assert!((narrow.x + 8.0 - (widest.x + 24.0)).abs() < f32::EPSILON);
        assert_eq!(narrow.color, GREY);
    }
}
