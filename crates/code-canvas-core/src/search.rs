//! Pixel offset to character index search within one line.

use std::ops::Range;

use crate::metrics::TextMetrics;
use crate::text::TextSnapshot;

/// Index of the character under the horizontal offset `x`, measured from the
/// start of the line.
///
/// Returns the rightmost `i` in `[line_start, line_end)` whose prefix
/// `[line_start, i)` is no wider than `x`, i.e. the character whose extent
/// contains `x`. Offsets past the end of the line yield the last character;
/// an empty line yields `line_start`.
///
/// Widths are measured, never derived from a fixed advance, so the search
/// stays correct for glyphs of different widths. Costs `O(log n)` measurements.
pub fn char_index_at_x<M>(
    metrics: &M,
    text: &TextSnapshot,
    x: f32,
    line_start: usize,
    line_end: usize,
) -> usize
where
    M: TextMetrics + ?Sized,
{
    // Offset zero is always the line start; NaN and negative offsets too.
    if !(x > 0.0) || line_end <= line_start {
        return line_start;
    }
    let mut low = line_start;
    let mut high = line_end - 1;
    while low < high {
        let mid = low + (high - low).div_ceil(2);
        if metrics.measure_range(text, line_start, mid) <= x {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// Character range of a line that falls inside the horizontal span
/// `[left, right]`, both measured from the start of the line.
pub fn visible_char_span<M>(
    metrics: &M,
    text: &TextSnapshot,
    left: f32,
    right: f32,
    line_start: usize,
    line_end: usize,
) -> Range<usize>
where
    M: TextMetrics + ?Sized,
{
    if line_end <= line_start {
        return line_start..line_start;
    }
    let start = char_index_at_x(metrics, text, left, line_start, line_end);
    let end = (char_index_at_x(metrics, text, right, line_start, line_end) + 1).min(line_end);
    start..end.max(start)
}
