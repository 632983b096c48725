//! Reports the caret's line and column when the selection collapses.

use std::fmt;

use crate::text::TextSnapshot;

/// Receives the text of the caret's line and the caret column within it.
pub trait CursorChangeListener {
    fn on_cursor_change(&mut self, line: &str, column: usize);
}

impl<F: FnMut(&str, usize)> CursorChangeListener for F {
    fn on_cursor_change(&mut self, line: &str, column: usize) {
        (self)(line, column)
    }
}

/// The line holding a collapsed caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretLine {
    pub text: String,
    /// Caret offset from `line_start`, in chars.
    pub column: usize,
    pub line_start: usize,
}

/// Extracts the caret's line for a selection, or `None` when nothing should
/// be reported: a range selection, an empty document, or inconsistent bounds.
///
/// The newline search for the line start includes the caret position, so a
/// caret sitting on a `'\n'` ends up with `line_end < line_start` and is not
/// reported. The line start is clamped to the last char, which makes a caret
/// after a trailing newline report that newline with column 1.
pub fn caret_line(text: &TextSnapshot, sel_start: usize, sel_end: usize) -> Option<CaretLine> {
    if sel_start != sel_end || text.is_empty() {
        return None;
    }
    let len = text.len_chars();
    if sel_start > len {
        return None;
    }
    let line_start = text
        .rfind_newline_at_or_before(sel_start)
        .map_or(0, |nl| nl + 1)
        .min(len - 1);
    let line_end = text.find_newline_from(sel_start).unwrap_or(len);
    if line_end < line_start || line_end > len {
        return None;
    }
    let line = text.slice_to_string(line_start, line_end).ok()?;
    Some(CaretLine {
        text: line,
        column: sel_start - line_start,
        line_start,
    })
}

/// Holds at most one listener and forwards caret-line changes to it.
#[derive(Default)]
pub struct CursorLineNotifier {
    listener: Option<Box<dyn CursorChangeListener>>,
}

impl fmt::Debug for CursorLineNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorLineNotifier")
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl CursorLineNotifier {
    /// Registers the listener, dropping any previous one.
    pub fn set_listener(&mut self, listener: impl CursorChangeListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Handles a selection change. Returns whether the listener was notified.
    pub fn on_selection_changed(
        &mut self,
        text: &TextSnapshot,
        sel_start: usize,
        sel_end: usize,
    ) -> bool {
        let Some(listener) = self.listener.as_mut() else {
            return false;
        };
        let Some(caret) = caret_line(text, sel_start, sel_end) else {
            tracing::trace!(sel_start, sel_end, "selection change not reported");
            return false;
        };
        listener.on_cursor_change(&caret.text, caret.column);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<(String, usize)>>>, impl FnMut(&str, usize)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |line: &str, col: usize| {
            sink.borrow_mut().push((line.to_string(), col))
        })
    }

    #[test]
    fn test_caret_inside_middle_line() {
        let text = TextSnapshot::from("abc\ndef\nghi");
        let caret = caret_line(&text, 5, 5).unwrap();
        assert_eq!((caret.text.as_str(), caret.column), ("def", 1));
        assert_eq!(caret.line_start, 4);
    }

    #[test]
    fn test_caret_on_newline_is_not_reported() {
        let text = TextSnapshot::from("abc\ndef");
        assert!(caret_line(&text, 3, 3).is_none());
        assert!(caret_line(&TextSnapshot::from("\n\n"), 0, 0).is_none());
    }

    #[test]
    fn test_caret_after_newline_starts_next_line() {
        let text = TextSnapshot::from("abc\ndef");
        let caret = caret_line(&text, 4, 4).unwrap();
        assert_eq!((caret.text.as_str(), caret.column), ("def", 0));
    }

    #[test]
    fn test_caret_at_document_end() {
        let text = TextSnapshot::from("abc\ndef");
        let caret = caret_line(&text, 7, 7).unwrap();
        assert_eq!((caret.text.as_str(), caret.column), ("def", 3));

        let trailing = TextSnapshot::from("abc\n");
        let caret = caret_line(&trailing, 4, 4).unwrap();
        assert_eq!((caret.text.as_str(), caret.column), ("\n", 1));
        assert_eq!(caret.line_start, 3);
    }

    #[test]
    fn test_nothing_for_ranges_empty_text_or_out_of_bounds() {
        let text = TextSnapshot::from("abc\ndef");
        assert!(caret_line(&text, 2, 4).is_none());
        assert!(caret_line(&TextSnapshot::default(), 0, 0).is_none());
        assert!(caret_line(&text, 99, 99).is_none());
    }

    #[test]
    fn test_notifier_without_listener_is_silent() {
        let mut notifier = CursorLineNotifier::default();
        assert!(!notifier.on_selection_changed(&TextSnapshot::from("abc"), 1, 1));
    }

    #[test]
    fn test_notifier_forwards_to_latest_listener_only() {
        let text = TextSnapshot::from("abc\ndef\nghi");
        let (first, first_listener) = recorder();
        let (second, second_listener) = recorder();

        let mut notifier = CursorLineNotifier::default();
        notifier.set_listener(first_listener);
        assert!(notifier.on_selection_changed(&text, 9, 9));
        notifier.set_listener(second_listener);
        assert!(notifier.on_selection_changed(&text, 5, 5));
        assert!(!notifier.on_selection_changed(&text, 2, 4));

        assert_eq!(*first.borrow(), vec![("ghi".to_string(), 1)]);
        assert_eq!(*second.borrow(), vec![("def".to_string(), 1)]);
    }
}
