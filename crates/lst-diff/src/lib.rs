//! Hunk differencer for line-status tracking.
//!
//! Compares the lines of a current text against its baseline and produces
//! the changed [`Range`](lst_types::Range)s. The computation is a pure
//! function: it never touches shared state, enforces a size and time budget,
//! and stops early when its [`CancellationToken`] fires.
//!
//! # Key Types
//!
//! - [`compute_ranges`] -- Entry point for both comparison modes
//! - [`DiffMode`] -- `Simple` (exact) or `Smart` (whitespace-aware, with inner ranges)
//! - [`DiffLimits`] -- Window size and time budget
//! - [`CancellationToken`] -- Cooperative cancellation flag
//! - [`DiffStats`] -- Line totals over a range list

mod align;
pub mod cancel;
pub mod config;
pub mod error;
pub mod ranges;
pub mod stats;

pub use cancel::CancellationToken;
pub use config::{DiffLimits, DiffMode};
pub use error::{DiffError, DiffResult};
pub use ranges::compute_ranges;
pub use stats::DiffStats;
