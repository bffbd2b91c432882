//! Error types for the range tracker.

use lst_diff::DiffError;
use lst_text::TextError;
use thiserror::Error;

use crate::status::TrackerStatus;

/// Errors produced by tracker operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The differencer failed (too big, deadline, or cancelled).
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    /// Reading or editing the document failed.
    #[error("document error: {0}")]
    Text(#[from] TextError),

    /// Edit bookkeeping no longer matches the document.
    #[error("inconsistent tracker state: {0}")]
    Inconsistent(String),

    /// The tracker cannot vouch for its ranges, so nothing was written.
    #[error("ranges are not valid while the tracker is {0}")]
    NotValid(TrackerStatus),

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias used throughout the tracker crate.
pub type TrackerResult<T> = Result<T, TrackerError>;
