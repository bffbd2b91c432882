use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// How a span of the current text relates to its baseline counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    /// Same content on both sides. Only used for inner ranges, where it marks
    /// lines that differ in whitespace alone.
    Equal,
    /// Lines present only in the current text.
    Inserted,
    /// Lines present only in the baseline.
    Deleted,
    /// Lines present on both sides with different content.
    Modified,
}

impl RangeKind {
    /// Derive the kind of a changed block from the line counts of each side.
    ///
    /// Returns `None` when both sides are empty, which is never a change.
    pub fn from_lengths(current_len: usize, baseline_len: usize) -> Option<Self> {
        match (current_len, baseline_len) {
            (0, 0) => None,
            (_, 0) => Some(Self::Inserted),
            (0, _) => Some(Self::Deleted),
            _ => Some(Self::Modified),
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Equal => "equal",
            Self::Inserted => "inserted",
            Self::Deleted => "deleted",
            Self::Modified => "modified",
        };
        f.pad(label)
    }
}

/// Identity of an installed range.
///
/// The differencer produces ranges with [`RangeId::NONE`]; a tracker assigns
/// a fresh id when it installs a range and keeps it for as long as the range
/// survives incremental updates unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RangeId(pub u64);

impl RangeId {
    /// Placeholder id for ranges that were never installed.
    pub const NONE: RangeId = RangeId(0);

    /// Returns `true` if this id was assigned by a tracker.
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Line-level classification inside a [`Range`].
///
/// All four coordinates are relative to the owning range's start on the
/// respective side, so an inner range stays valid when its owner shifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InnerRange {
    pub line1: usize,
    pub line2: usize,
    pub vcs_line1: usize,
    pub vcs_line2: usize,
    pub kind: RangeKind,
}

impl InnerRange {
    pub fn new(line1: usize, line2: usize, vcs_line1: usize, vcs_line2: usize, kind: RangeKind) -> Self {
        Self {
            line1,
            line2,
            vcs_line1,
            vcs_line2,
            kind,
        }
    }
}

/// One contiguous changed region between the current text and the baseline.
///
/// `[line1, line2)` addresses the current text, `[vcs_line1, vcs_line2)` the
/// baseline. A `Deleted` range is zero-height on the current side and sits
/// right before `line1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub id: RangeId,
    pub line1: usize,
    pub line2: usize,
    pub vcs_line1: usize,
    pub vcs_line2: usize,
    pub kind: RangeKind,
    /// Present only on `Modified` ranges built in smart mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<Vec<InnerRange>>,
}

impl Range {
    /// Create a range, deriving its kind from the two spans.
    ///
    /// Both spans must be well-formed and at least one must be non-empty; see
    /// [`Range::try_new`] for the checked variant.
    pub fn new(line1: usize, line2: usize, vcs_line1: usize, vcs_line2: usize) -> Self {
        debug_assert!(line1 <= line2 && vcs_line1 <= vcs_line2);
        let kind = RangeKind::from_lengths(line2 - line1, vcs_line2 - vcs_line1)
            .unwrap_or(RangeKind::Equal);
        Self {
            id: RangeId::NONE,
            line1,
            line2,
            vcs_line1,
            vcs_line2,
            kind,
            inner: None,
        }
    }

    /// Checked constructor.
    pub fn try_new(
        line1: usize,
        line2: usize,
        vcs_line1: usize,
        vcs_line2: usize,
    ) -> Result<Self, TypeError> {
        if line1 > line2 {
            return Err(TypeError::InvalidCurrentSpan { line1, line2 });
        }
        if vcs_line1 > vcs_line2 {
            return Err(TypeError::InvalidBaselineSpan { vcs_line1, vcs_line2 });
        }
        if line1 == line2 && vcs_line1 == vcs_line2 {
            return Err(TypeError::EmptyRange { line: line1 });
        }
        Ok(Self::new(line1, line2, vcs_line1, vcs_line2))
    }

    /// Attach inner ranges. Ignored unless the range is `Modified`.
    pub fn with_inner(mut self, inner: Vec<InnerRange>) -> Self {
        if self.kind == RangeKind::Modified {
            self.inner = Some(inner);
        }
        self
    }

    pub fn with_id(mut self, id: RangeId) -> Self {
        self.id = id;
        self
    }

    /// Number of lines on the current side.
    pub fn current_len(&self) -> usize {
        self.line2 - self.line1
    }

    /// Number of lines on the baseline side.
    pub fn baseline_len(&self) -> usize {
        self.vcs_line2 - self.vcs_line1
    }

    /// How many lines the current text gained over the baseline inside this
    /// range.
    pub fn line_shift(&self) -> isize {
        self.current_len() as isize - self.baseline_len() as isize
    }

    /// Returns `true` if `line` of the current text belongs to this range.
    ///
    /// A zero-height range is selected by the line it sits in front of.
    pub fn is_selected_by_line(&self, line: usize) -> bool {
        if self.line1 == self.line2 {
            line == self.line1
        } else {
            self.line1 <= line && line < self.line2
        }
    }

    /// Returns `true` if every inner range is `Equal`, meaning the whole
    /// range differs from the baseline in whitespace only.
    pub fn is_whitespace_only(&self) -> bool {
        match &self.inner {
            Some(inner) => !inner.is_empty() && inner.iter().all(|i| i.kind == RangeKind::Equal),
            None => false,
        }
    }

    /// Compare everything except identity.
    pub fn same_lines(&self, other: &Range) -> bool {
        self.line1 == other.line1
            && self.line2 == other.line2
            && self.vcs_line1 == other.vcs_line1
            && self.vcs_line2 == other.vcs_line2
            && self.kind == other.kind
            && self.inner == other.inner
    }

    /// Move the range by `current` lines on the current side and `baseline`
    /// lines on the baseline side.
    pub fn offset(mut self, current: usize, baseline: usize) -> Self {
        self.line1 += current;
        self.line2 += current;
        self.vcs_line1 += baseline;
        self.vcs_line2 += baseline;
        self
    }

    /// Shift the current side by a signed amount, leaving the baseline alone.
    pub fn shifted(&self, delta: isize) -> Self {
        let mut shifted = self.clone();
        shifted.line1 = self.line1.saturating_add_signed(delta);
        shifted.line2 = self.line2.saturating_add_signed(delta);
        shifted
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) <- [{}, {}) {}",
            self.line1, self.line2, self.vcs_line1, self.vcs_line2, self.kind
        )
    }
}

/// Which buffer a line number is mapped into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    /// From the current text into the baseline.
    ToBaseline,
    /// From the baseline into the current text.
    FromBaseline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_lengths() {
        assert_eq!(RangeKind::from_lengths(0, 0), None);
        assert_eq!(RangeKind::from_lengths(2, 0), Some(RangeKind::Inserted));
        assert_eq!(RangeKind::from_lengths(0, 3), Some(RangeKind::Deleted));
        assert_eq!(RangeKind::from_lengths(1, 1), Some(RangeKind::Modified));
    }

    #[test]
    fn new_derives_kind() {
        assert_eq!(Range::new(1, 2, 1, 2).kind, RangeKind::Modified);
        assert_eq!(Range::new(1, 1, 1, 2).kind, RangeKind::Deleted);
        assert_eq!(Range::new(1, 2, 1, 1).kind, RangeKind::Inserted);
    }

    #[test]
    fn try_new_rejects_malformed_spans() {
        assert_eq!(
            Range::try_new(3, 2, 0, 0),
            Err(TypeError::InvalidCurrentSpan { line1: 3, line2: 2 })
        );
        assert_eq!(
            Range::try_new(0, 1, 5, 4),
            Err(TypeError::InvalidBaselineSpan { vcs_line1: 5, vcs_line2: 4 })
        );
        assert_eq!(Range::try_new(4, 4, 7, 7), Err(TypeError::EmptyRange { line: 4 }));
    }

    #[test]
    fn deleted_range_is_selected_by_following_line() {
        let deleted = Range::new(3, 3, 3, 5);
        assert!(deleted.is_selected_by_line(3));
        assert!(!deleted.is_selected_by_line(2));
        assert!(!deleted.is_selected_by_line(4));

        let modified = Range::new(3, 5, 3, 4);
        assert!(modified.is_selected_by_line(3));
        assert!(modified.is_selected_by_line(4));
        assert!(!modified.is_selected_by_line(5));
    }

    #[test]
    fn inner_ranges_only_on_modified() {
        let inner = vec![InnerRange::new(0, 1, 0, 1, RangeKind::Equal)];
        let inserted = Range::new(0, 1, 0, 0).with_inner(inner.clone());
        assert!(inserted.inner.is_none());

        let modified = Range::new(0, 1, 0, 1).with_inner(inner);
        assert!(modified.is_whitespace_only());
    }

    #[test]
    fn same_lines_ignores_identity() {
        let a = Range::new(1, 2, 1, 2).with_id(RangeId(7));
        let b = Range::new(1, 2, 1, 2).with_id(RangeId(9));
        assert_ne!(a, b);
        assert!(a.same_lines(&b));
    }

    #[test]
    fn shift_moves_only_current_side() {
        let r = Range::new(4, 6, 4, 5);
        let up = r.shifted(-2);
        assert_eq!((up.line1, up.line2, up.vcs_line1, up.vcs_line2), (2, 4, 4, 5));
        let down = r.shifted(3);
        assert_eq!((down.line1, down.line2), (7, 9));
        assert_eq!(r.line_shift(), 1);
    }

    #[test]
    fn serde_skips_missing_inner() {
        let r = Range::new(0, 1, 0, 1);
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("inner"));
        let parsed: Range = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }
}
