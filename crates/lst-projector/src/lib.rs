//! Visible range projector.
//!
//! Turns a snapshot of tracked ranges into the merged blocks a gutter paints
//! for one viewport. Projection is a pure function of the ranges, the layout
//! and the viewport, so it can run on every repaint.
//!
//! # Key Types
//!
//! - [`VisibleRangeProjector`] -- Entry point
//! - [`VisualLayout`] -- Logical line to visual row mapping
//! - [`FoldingLayout`] -- Layout with collapsed regions
//! - [`ChangesBlock`] -- One contiguous group of [`ChangedLines`]

pub mod layout;
pub mod projector;

pub use layout::{Fold, FoldingLayout, PlainLayout, VisualLayout};
pub use projector::{ChangedLines, ChangesBlock, Viewport, VisibleRangeProjector};
