//! The authoritative text buffer.
//!
//! Offsets are byte offsets into the UTF-8 content and always lie on `char`
//! boundaries. Only the mutation gate (through crate-private methods) may
//! change an [`EditableText`].

use std::fmt;
use std::ops::Range;

use crate::error::{EditError, Result};

/// A half-open byte range `start..end` into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a range. `start` must not exceed `end`.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty range (a caret) at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range is a caret.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Convert to a standard library range for slicing.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Where a mutation attempt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChangeOrigin {
    /// Typed, pasted, dictated or committed by an input method.
    #[default]
    Interactive,
    /// Assigned by host code.
    Programmatic,
}

/// The editable content with its selection and composition state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableText {
    content: String,
    selection: TextRange,
    composing: Option<TextRange>,
}

impl EditableText {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text` with the caret at its end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let content = text.into();
        let end = content.len();
        Self {
            content,
            selection: TextRange::caret(end),
            composing: None,
        }
    }

    /// The full buffer, including any marked (composing) text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The current caret or selection.
    pub fn selection(&self) -> TextRange {
        self.selection
    }

    /// The span of marked text while an input method is composing.
    pub fn composing(&self) -> Option<TextRange> {
        self.composing
    }

    /// Whether an input method is composing.
    pub fn is_composing(&self) -> bool {
        self.composing.is_some()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// The text covered by `range`. The range must be valid.
    pub fn slice(&self, range: TextRange) -> &str {
        &self.content[range.as_range()]
    }

    /// The buffer without the marked text, i.e. what has been committed.
    pub fn committed(&self) -> String {
        match self.composing {
            Some(marked) => {
                let mut committed = String::with_capacity(self.content.len() - marked.len());
                committed.push_str(&self.content[..marked.start]);
                committed.push_str(&self.content[marked.end..]);
                committed
            }
            None => self.content.clone(),
        }
    }

    /// Check that `range` is ordered, in bounds and on `char` boundaries.
    pub fn validate(&self, range: TextRange) -> Result<()> {
        if range.start > range.end {
            return Err(EditError::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.content.len() {
            return Err(EditError::out_of_bounds(
                range.start,
                range.end,
                self.content.len(),
            ));
        }
        for offset in [range.start, range.end] {
            if !self.content.is_char_boundary(offset) {
                return Err(EditError::not_char_boundary(offset));
            }
        }
        Ok(())
    }

    /// Replace `range` with `text` and place the caret after the inserted text.
    ///
    /// A composing span is kept in step with the edit: edits inside it grow
    /// or shrink it, edits before it shift it, and edits straddling its
    /// edges end the composition. Returns the span of the inserted text.
    pub(crate) fn replace(&mut self, range: TextRange, text: &str) -> TextRange {
        self.content.replace_range(range.as_range(), text);
        let inserted = TextRange::new(range.start, range.start + text.len());
        self.selection = TextRange::caret(inserted.end);

        self.composing = self.composing.and_then(|marked| {
            if marked.contains_range(range) {
                Some(TextRange::new(
                    marked.start,
                    marked.end - range.len() + text.len(),
                ))
            } else if range.end <= marked.start {
                let shift = |offset: usize| offset - range.len() + text.len();
                Some(TextRange::new(shift(marked.start), shift(marked.end)))
            } else if range.start >= marked.end {
                Some(marked)
            } else {
                None
            }
        });

        inserted
    }

    /// Cut the buffer down to `len` bytes, clamping selection and composition.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.content.len() {
            return;
        }
        self.content.truncate(len);
        let clamp = |r: TextRange| TextRange::new(r.start.min(len), r.end.min(len));
        self.selection = clamp(self.selection);
        self.composing = self
            .composing
            .map(clamp)
            .filter(|marked| !marked.is_empty());
    }

    pub(crate) fn set_selection(&mut self, selection: TextRange) {
        self.selection = selection;
    }

    pub(crate) fn set_composing(&mut self, composing: Option<TextRange>) {
        self.composing = composing;
    }
}

impl fmt::Display for EditableText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_text_places_caret_at_end() {
        let text = EditableText::with_text("Hello");
        assert_eq!(text.selection(), TextRange::caret(5));
        assert!(!text.is_composing());
    }

    #[test]
    fn test_validate() {
        let text = EditableText::with_text("a中b");
        assert!(text.validate(TextRange::new(0, 5)).is_ok());
        assert!(text.validate(TextRange::new(1, 4)).is_ok());
        assert!(matches!(
            text.validate(TextRange::new(0, 6)),
            Err(EditError::RangeOutOfBounds { len: 5, .. })
        ));
        assert!(matches!(
            text.validate(TextRange::new(2, 4)),
            Err(EditError::NotCharBoundary { offset: 2 })
        ));
        assert!(matches!(
            text.validate(TextRange::new(3, 1)),
            Err(EditError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_replace_moves_caret() {
        let mut text = EditableText::with_text("Hello World");
        let inserted = text.replace(TextRange::new(6, 11), "Rust");
        assert_eq!(text.content(), "Hello Rust");
        assert_eq!(inserted, TextRange::new(6, 10));
        assert_eq!(text.selection(), TextRange::caret(10));
    }

    #[test]
    fn test_replace_tracks_composing_span() {
        let mut text = EditableText::with_text("ab");
        text.set_composing(Some(TextRange::new(2, 2)));

        // Growing the marked text from inside.
        text.replace(TextRange::new(2, 2), "hua");
        assert_eq!(text.composing(), Some(TextRange::new(2, 5)));

        // An edit before the marked text shifts it.
        text.replace(TextRange::new(0, 0), "xy");
        assert_eq!(text.content(), "xyabhua");
        assert_eq!(text.composing(), Some(TextRange::new(4, 7)));

        // Typing at the trailing edge extends it.
        text.replace(TextRange::new(7, 7), "n");
        assert_eq!(text.content(), "xyabhuan");
        assert_eq!(text.composing(), Some(TextRange::new(4, 8)));

        // Straddling an edge ends the composition.
        text.replace(TextRange::new(3, 5), "");
        assert_eq!(text.composing(), None);
    }

    #[test]
    fn test_committed_excludes_marked_text() {
        let mut text = EditableText::with_text("ab");
        text.replace(TextRange::caret(2), "ni");
        text.set_composing(Some(TextRange::new(2, 4)));
        assert_eq!(text.content(), "abni");
        assert_eq!(text.committed(), "ab");
    }

    #[test]
    fn test_truncate_clamps_selection() {
        let mut text = EditableText::with_text("Hello World");
        text.set_selection(TextRange::new(3, 11));
        text.truncate(5);
        assert_eq!(text.content(), "Hello");
        assert_eq!(text.selection(), TextRange::new(3, 5));

        // Truncating to a longer length is a no-op.
        text.truncate(50);
        assert_eq!(text.content(), "Hello");
    }
}
