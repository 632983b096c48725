//! Highlight token maps and the slot they are published through.
//!
//! A background highlighter builds a complete [`HighlightTokens`] value and
//! publishes it in one atomic swap. The render thread loads the slot once
//! per draw pass and uses that snapshot for every line of the pass.

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use code_canvas_config::HexColor;

/// Per-character colors computed against a text of `len()` characters.
///
/// Immutable once built; replaced wholesale when highlighting reruns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightTokens {
    colors: Arc<[HexColor]>,
}

impl HighlightTokens {
    pub fn new(colors: Vec<HexColor>) -> Self {
        Self {
            colors: colors.into(),
        }
    }

    /// A map of `len` characters all colored `color`.
    pub fn uniform(len: usize, color: HexColor) -> Self {
        Self::new(vec![color; len])
    }

    /// Builds a map of `len` characters from colored char ranges.
    ///
    /// Characters not covered by any span get `default`. Later spans win
    /// where spans overlap; parts of spans beyond `len` are ignored.
    pub fn from_spans<I>(len: usize, default: HexColor, spans: I) -> Self
    where
        I: IntoIterator<Item = (Range<usize>, HexColor)>,
    {
        let mut colors = vec![default; len];
        for (range, color) in spans {
            let end = range.end.min(len);
            if range.start < end {
                colors[range.start..end].fill(color);
            }
        }
        Self::new(colors)
    }

    /// Length of the text these tokens were computed for.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color of the character at `index`, or `None` past the computed text.
    pub fn char_color(&self, index: usize) -> Option<HexColor> {
        self.colors.get(index).copied()
    }
}

/// Holds the latest published token map. Single writer wins, readers never
/// observe a partially built value.
pub struct TokenSlot {
    current: ArcSwapOption<HighlightTokens>,
}

impl Default for TokenSlot {
    fn default() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }
}

impl fmt::Debug for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.current.load_full().map(|t| t.len());
        f.debug_struct("TokenSlot").field("tokens_len", &len).finish()
    }
}

impl TokenSlot {
    pub fn publish(&self, tokens: HighlightTokens) {
        self.current.store(Some(Arc::new(tokens)));
    }

    pub fn clear(&self) {
        self.current.store(None);
    }

    /// Returns the current snapshot. Hold on to it for a whole draw pass.
    pub fn load(&self) -> Option<Arc<HighlightTokens>> {
        self.current.load_full()
    }
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Shared "needs redraw" flag with an optional host wake-up callback.
#[derive(Clone, Default)]
pub struct RedrawSignal {
    pending: Arc<AtomicBool>,
    waker: Option<Waker>,
}

impl fmt::Debug for RedrawSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedrawSignal")
            .field("pending", &self.pending.load(Ordering::Relaxed))
            .field("has_waker", &self.waker.is_some())
            .finish()
    }
}

impl RedrawSignal {
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            pending: Arc::default(),
            waker: Some(Arc::new(waker)),
        }
    }

    /// Marks a redraw as pending and wakes the host, from any thread.
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
        if let Some(waker) = &self.waker {
            waker();
        }
    }

    /// Returns whether a redraw was pending and clears the flag.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Producer-side handle given to the highlighter. Cheap to clone, `Send + Sync`.
#[derive(Debug, Clone)]
pub struct TokenPublisher {
    slot: Arc<TokenSlot>,
    redraw: RedrawSignal,
}

impl TokenPublisher {
    pub fn new(slot: Arc<TokenSlot>, redraw: RedrawSignal) -> Self {
        Self { slot, redraw }
    }

    /// Publishes a complete token map and requests a redraw.
    pub fn publish(&self, tokens: HighlightTokens) {
        tracing::trace!(len = tokens.len(), "publishing highlight tokens");
        self.slot.publish(tokens);
        self.redraw.request();
    }
}
