//! Current-text model for line-status tracking.
//!
//! Provides [`Document`], a line-indexed text buffer that reports each edit
//! to its [`EditListener`]s as a before/after pair. A line-status tracker
//! subscribes to a document and reads its lines when it recomputes ranges.
//!
//! # Key Types
//!
//! - [`Document`] -- Shared text buffer with a line table and edit notifications
//! - [`EditEvent`] -- Offset, old length and new length of one edit
//! - [`EditListener`] -- Subscriber interface for edit notifications

pub mod document;
pub mod error;
pub mod listener;

pub use document::Document;
pub use error::{TextError, TextResult};
pub use listener::{EditEvent, EditListener, ListenerId};
