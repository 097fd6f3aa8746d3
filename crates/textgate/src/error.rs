//! Error types for the editing controller.
//!
//! Policy outcomes (length rejections, submit-on-Enter) are not errors; they
//! are reported through [`ChangeOutcome`](crate::ChangeOutcome) and the
//! observer. Errors here indicate host misuse or bad configuration.

/// Result type alias for editing operations.
pub type Result<T> = std::result::Result<T, EditError>;

/// Errors that can occur when driving a [`GuardedTextEdit`](crate::GuardedTextEdit).
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// A range extends past the end of the buffer.
    #[error("range {start}..{end} is out of bounds for a buffer of {len} bytes")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    /// A range endpoint splits a UTF-8 sequence.
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// A range whose start lies after its end.
    #[error("range start {start} is after its end {end}")]
    InvertedRange { start: usize, end: usize },

    /// Configuration could not be parsed.
    #[error("invalid text edit configuration: {source}")]
    Config {
        #[source]
        source: toml::de::Error,
    },
}

impl EditError {
    /// Create an out-of-bounds error.
    pub fn out_of_bounds(start: usize, end: usize, len: usize) -> Self {
        Self::RangeOutOfBounds { start, end, len }
    }

    /// Create a character boundary error.
    pub fn not_char_boundary(offset: usize) -> Self {
        Self::NotCharBoundary { offset }
    }

    /// Whether this error is a violated precondition on a text range.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::RangeOutOfBounds { .. } | Self::NotCharBoundary { .. } | Self::InvertedRange { .. }
        )
    }
}

impl From<toml::de::Error> for EditError {
    fn from(source: toml::de::Error) -> Self {
        Self::Config { source }
    }
}
