//! Error types for the differencer.

use std::time::Duration;

/// Errors that can occur while computing ranges.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The changed window left after stripping the common prefix and suffix
    /// is larger than the configured limit.
    #[error("diff too big: {window_lines} lines in the changed window exceed the limit of {limit}")]
    TooBig { window_lines: usize, limit: usize },

    /// The comparison ran past its time budget.
    #[error("diff exceeded its time budget of {budget:?}")]
    DeadlineExceeded { budget: Duration },

    /// The caller cancelled the computation.
    #[error("diff cancelled")]
    Cancelled,
}

impl DiffError {
    /// Returns `true` for the errors that mean "this input is too large to
    /// diff", as opposed to cancellation.
    pub fn is_too_big(&self) -> bool {
        matches!(self, Self::TooBig { .. } | Self::DeadlineExceeded { .. })
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
