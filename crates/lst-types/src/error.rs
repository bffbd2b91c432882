use thiserror::Error;

/// Errors produced when constructing foundation values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid current span: line1 {line1} > line2 {line2}")]
    InvalidCurrentSpan { line1: usize, line2: usize },

    #[error("invalid baseline span: vcs_line1 {vcs_line1} > vcs_line2 {vcs_line2}")]
    InvalidBaselineSpan { vcs_line1: usize, vcs_line2: usize },

    #[error("empty range: both sides are zero-length at line {line}")]
    EmptyRange { line: usize },

    #[error("invalid edit span: {0}")]
    InvalidEditSpan(String),
}
