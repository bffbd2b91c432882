//! Error types for document operations.

use thiserror::Error;

/// Errors that can occur when reading or editing a [`Document`](crate::Document).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    /// A byte offset or span end lies past the end of the text.
    #[error("offset {offset} out of bounds for text of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// A byte offset splits a UTF-8 character.
    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),

    /// A line number lies past the last line.
    #[error("line {line} out of bounds for document with {line_count} lines")]
    LineOutOfBounds { line: usize, line_count: usize },

    /// A line span with `line1 > line2`.
    #[error("invalid line span [{line1}, {line2})")]
    InvalidLineSpan { line1: usize, line2: usize },
}

/// Convenience alias for document results.
pub type TextResult<T> = Result<T, TextError>;
