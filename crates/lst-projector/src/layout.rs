use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maps logical line starts to visual rows.
///
/// Implementations must be monotonic: a later line never maps to an earlier
/// row.
pub trait VisualLayout {
    /// Row at which `line` starts. `line` may equal the line count.
    fn visual_row(&self, line: usize) -> usize;
}

/// One row per line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlainLayout;

impl VisualLayout for PlainLayout {
    fn visual_row(&self, line: usize) -> usize {
        line
    }
}

/// A collapsed region. `start` stays visible as the placeholder row, lines
/// `start + 1 .. end` are hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fold {
    pub start: usize,
    pub end: usize,
}

impl Fold {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    fn hidden_before(&self, line: usize) -> usize {
        let first_hidden = self.start + 1;
        line.clamp(first_hidden, self.end.max(first_hidden)) - first_hidden
    }
}

impl fmt::Display for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl FromStr for Fold {
    type Err = String;

    /// Parses `start..end`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..")
            .ok_or_else(|| format!("expected START..END, got {s:?}"))?;
        let start = start.trim().parse().map_err(|e| format!("bad fold start {start:?}: {e}"))?;
        let end = end.trim().parse().map_err(|e| format!("bad fold end {end:?}: {e}"))?;
        Ok(Self::new(start, end))
    }
}

/// Layout with folded regions. Every hidden line maps to the row right after
/// its fold's placeholder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FoldingLayout {
    folds: Vec<Fold>,
}

impl FoldingLayout {
    /// Build a layout. Overlapping or nested folds collapse into one; folds
    /// that hide nothing are dropped.
    pub fn new(folds: impl IntoIterator<Item = Fold>) -> Self {
        let mut sorted: Vec<Fold> = folds.into_iter().filter(|f| f.end > f.start + 1).collect();
        sorted.sort_by_key(|f| (f.start, f.end));

        let mut merged: Vec<Fold> = Vec::with_capacity(sorted.len());
        for fold in sorted {
            match merged.last_mut() {
                Some(last) if fold.start < last.end => last.end = last.end.max(fold.end),
                _ => merged.push(fold),
            }
        }
        Self { folds: merged }
    }

    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    /// Returns `true` if `line` is inside a collapsed region.
    pub fn is_hidden(&self, line: usize) -> bool {
        self.folds.iter().any(|f| f.start < line && line < f.end)
    }
}

impl VisualLayout for FoldingLayout {
    fn visual_row(&self, line: usize) -> usize {
        let hidden: usize = self
            .folds
            .iter()
            .take_while(|f| f.start < line)
            .map(|f| f.hidden_before(line))
            .sum();
        line - hidden
    }
}
