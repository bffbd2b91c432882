//! Incremental range tracker for line-status markers.
//!
//! A [`LineStatusTracker`] subscribes to a [`Document`](lst_text::Document),
//! folds every edit into a single dirty window, and recomputes only that
//! window (plus the ranges it touches) the next time ranges are read on the
//! owning thread. Ranges the update leaves alone keep their identity.
//!
//! # Key Types
//!
//! - [`LineStatusTracker`] -- The tracker handle
//! - [`TrackerConfig`] -- Diff mode, limits and neighbour expansion policy
//! - [`TrackerHost`] -- Install/dispose/too-big notifications
//! - [`TrackerStatus`] -- Lifecycle state as seen by callers
//! - [`DirtyRange`] -- Coalesced window of pending edits

pub mod config;
pub mod dirty;
pub mod error;
pub mod host;
mod query;
mod state;
pub mod status;
pub mod tracker;

pub use config::{GapPolicy, TrackerConfig};
pub use dirty::DirtyRange;
pub use error::{TrackerError, TrackerResult};
pub use host::{NoopHost, TrackerHost};
pub use status::{SuppressReason, TrackerStatus};
pub use tracker::LineStatusTracker;
