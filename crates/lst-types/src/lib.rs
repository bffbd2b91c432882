//! Foundation types for line-status tracking.
//!
//! This crate provides the value types shared by the differencer, the range
//! tracker and the visible range projector. Every other `lst` crate depends on
//! `lst-types`.
//!
//! All line numbers are 0-based and every span is half-open: a range
//! `[line1, line2)` with `line1 == line2` is a zero-height marker sitting
//! before `line1`.
//!
//! # Key Types
//!
//! - [`Range`] -- One changed region between the current text and its baseline
//! - [`InnerRange`] -- Line-level classification inside a modified range
//! - [`RangeKind`] -- `Equal`, `Inserted`, `Deleted` or `Modified`
//! - [`RangeId`] -- Identity assigned to a range when a tracker installs it
//! - [`EditSpan`] -- Before/after line window touched by one edit
//! - [`TransferDirection`] -- Which buffer a line number is mapped into

pub mod edit;
pub mod error;
pub mod lines;
pub mod range;

pub use edit::EditSpan;
pub use error::TypeError;
pub use lines::{is_blank, split_lines, whitespace_key};
pub use range::{InnerRange, Range, RangeId, RangeKind, TransferDirection};
