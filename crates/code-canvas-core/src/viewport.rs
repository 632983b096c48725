//! Viewport resolution: which lines, and which horizontal pixel span, are on screen.
//!
//! The containing scroll frame is an explicit collaborator. Its state is read
//! through [`ScrollFrameProvider`] once per draw pass.

use std::ops::RangeInclusive;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::layout::LineLayout;

/// Inclusive band of visible lines. "Nothing visible" is `None` at the call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleLineRange {
    pub first: usize,
    pub last: usize,
}

impl VisibleLineRange {
    pub fn new(first: usize, last: usize) -> Self {
        debug_assert!(first <= last, "inverted line range {first}..={last}");
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// A resolved range always holds at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.first..=self.last).contains(&line)
    }

    pub fn lines(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Scroll state of the content and of the frame that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollFrame {
    /// Horizontal scroll offset of the frame.
    pub scroll_x: f32,
    /// Vertical scroll offset of the frame.
    pub scroll_y: f32,
    /// Viewport width of the frame.
    pub width: f32,
    /// Viewport height of the frame.
    pub height: f32,
    /// The frame's own top padding.
    pub padding_top: f32,
    /// Horizontal scroll of the content inside the frame.
    pub content_scroll_x: f32,
    /// Vertical scroll of the content inside the frame.
    pub content_scroll_y: f32,
}

impl ScrollFrame {
    /// Frame viewport of the given size, not scrolled.
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn scrolled_to(self, x: f32, y: f32) -> Self {
        Self {
            scroll_x: x,
            scroll_y: y,
            ..self
        }
    }

    /// Total horizontal scroll of the content.
    pub fn real_scroll_x(&self) -> f32 {
        self.scroll_x + self.content_scroll_x
    }

    /// Total vertical scroll of the content.
    pub fn real_scroll_y(&self) -> f32 {
        self.scroll_y + self.content_scroll_y
    }
}

/// Capability to read the current scroll frame, supplied when the view is built.
pub trait ScrollFrameProvider {
    fn scroll_frame(&self) -> ScrollFrame;
}

impl ScrollFrameProvider for ScrollFrame {
    fn scroll_frame(&self) -> ScrollFrame {
        *self
    }
}

/// Scroll frame shared between the host widget (writer) and the view (reader).
#[derive(Debug, Clone)]
pub struct SharedScrollFrame(Arc<ArcSwap<ScrollFrame>>);

impl Default for SharedScrollFrame {
    fn default() -> Self {
        Self::new(ScrollFrame::default())
    }
}

impl SharedScrollFrame {
    pub fn new(frame: ScrollFrame) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(frame)))
    }

    pub fn set(&self, frame: ScrollFrame) {
        self.0.store(Arc::new(frame));
    }

    pub fn get(&self) -> ScrollFrame {
        **self.0.load()
    }
}

impl ScrollFrameProvider for SharedScrollFrame {
    fn scroll_frame(&self) -> ScrollFrame {
        self.get()
    }
}

/// Vertical band `[top, bottom)` of content that has to be drawn.
///
/// At the top of the document the band starts at zero. Otherwise the
/// non-scrollable `top_inset` is added and the frame's own padding removed.
pub fn clip_band(scroll_y: f32, padding_top: f32, height: f32, top_inset: f32) -> (f32, f32) {
    let top = if scroll_y <= 0.0 {
        0.0
    } else {
        top_inset + scroll_y - padding_top
    };
    (top, top + height)
}

/// Resolves the lines intersecting the frame's viewport.
///
/// Returns `None` when nothing is visible. The last line is clamped to the
/// layout's line count in case the layout lags behind the content.
pub fn resolve_visible_lines<L>(
    layout: &L,
    frame: &ScrollFrame,
    top_inset: f32,
) -> Option<VisibleLineRange>
where
    L: LineLayout + ?Sized,
{
    let (top, bottom) = clip_band(frame.real_scroll_y(), frame.padding_top, frame.height, top_inset);
    let range = layout.line_range_for_band(top, bottom)?;
    let last_line = layout.line_count().checked_sub(1)?;
    if range.first > last_line {
        return None;
    }
    Some(VisibleLineRange::new(range.first, range.last.min(last_line)))
}

/// Horizontal pixel span `[left, right]` of line content inside the frame,
/// measured from the start of the text (after the gutter).
pub fn horizontal_span(frame: &ScrollFrame, padding_left: f32) -> (f32, f32) {
    let left = (frame.real_scroll_x() - padding_left).max(0.0);
    (left, left + frame.width)
}
