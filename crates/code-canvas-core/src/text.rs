/// Immutable text snapshots and the storage interface they come from.
use std::fmt;

use anyhow::Result;
use ropey::Rope;

/// An immutable view of the document text, cheap to clone.
///
/// All character indices used by the renderer are valid against one snapshot.
/// Lines break on `'\n'` only.
#[derive(Debug, Clone, Default)]
pub struct TextSnapshot {
    rope: Rope,
}

impl From<&str> for TextSnapshot {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl From<String> for TextSnapshot {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<Rope> for TextSnapshot {
    fn from(rope: Rope) -> Self {
        Self { rope }
    }
}

impl fmt::Display for TextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl TextSnapshot {
    /// Returns the underlying rope (read-only).
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Returns the total number of characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of lines; a trailing newline opens an empty last line.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the char index of the start of a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line index is out of bounds.
    pub fn line_to_char(&self, line_idx: usize) -> Result<usize> {
        if line_idx >= self.rope.len_lines() {
            anyhow::bail!(
                "line index {} out of bounds (snapshot has {} lines)",
                line_idx,
                self.rope.len_lines()
            );
        }
        Ok(self.rope.line_to_char(line_idx))
    }

    /// Returns the character at a given char index.
    ///
    /// # Errors
    ///
    /// Returns an error if the char index is out of bounds.
    pub fn char_at(&self, char_idx: usize) -> Result<char> {
        if char_idx >= self.rope.len_chars() {
            anyhow::bail!(
                "char index {} out of bounds (snapshot has {} chars)",
                char_idx,
                self.rope.len_chars()
            );
        }
        Ok(self.rope.char(char_idx))
    }

    /// Copies the character range `[start..end)` into a `String`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn slice_to_string(&self, start: usize, end: usize) -> Result<String> {
        if start > end {
            anyhow::bail!("invalid range: start ({}) > end ({})", start, end);
        }
        if end > self.rope.len_chars() {
            anyhow::bail!(
                "range end {} out of bounds (snapshot has {} chars)",
                end,
                self.rope.len_chars()
            );
        }
        Ok(self.rope.slice(start..end).to_string())
    }

    /// Index of the last `'\n'` at or before `char_idx`. An index past the
    /// end searches from the last char.
    pub fn rfind_newline_at_or_before(&self, char_idx: usize) -> Option<usize> {
        let mut idx = char_idx.saturating_add(1).min(self.rope.len_chars());
        let mut chars = self.rope.chars_at(idx);
        while let Some(c) = chars.prev() {
            idx -= 1;
            if c == '\n' {
                return Some(idx);
            }
        }
        None
    }

    /// Index of the first `'\n'` at or after `char_idx`.
    pub fn find_newline_from(&self, char_idx: usize) -> Option<usize> {
        let start = char_idx.min(self.rope.len_chars());
        self.rope
            .chars_at(start)
            .position(|c| c == '\n')
            .map(|offset| start + offset)
    }
}

/// Read access to the external text-storage widget.
pub trait TextStorage {
    /// Current text snapshot.
    fn text(&self) -> TextSnapshot;

    /// Current selection as `(start, end)` char indices; equal for a caret.
    fn selection(&self) -> (usize, usize);

    /// Moves the selection. Callers pass indices already clamped to the text.
    fn select(&mut self, start: usize, end: usize);
}

/// Minimal in-memory storage: a snapshot plus a selection.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: TextSnapshot,
    selection: (usize, usize),
}

impl TextBuffer {
    pub fn new(text: impl Into<TextSnapshot>) -> Self {
        Self {
            text: text.into(),
            selection: (0, 0),
        }
    }

    /// Replaces the text, pulling the selection back inside the new bounds.
    pub fn set_text(&mut self, text: impl Into<TextSnapshot>) {
        self.text = text.into();
        let len = self.text.len_chars();
        self.selection = (self.selection.0.min(len), self.selection.1.min(len));
    }
}

impl TextStorage for TextBuffer {
    fn text(&self) -> TextSnapshot {
        self.text.clone()
    }

    fn selection(&self) -> (usize, usize) {
        self.selection
    }

    fn select(&mut self, start: usize, end: usize) {
        self.selection = (start, end);
    }
}
