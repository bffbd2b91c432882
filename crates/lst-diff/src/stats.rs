use serde::{Deserialize, Serialize};

use lst_types::{Range, RangeKind};

/// Line totals over a range list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Current-side lines of `Inserted` and `Modified` ranges.
    pub inserted: usize,
    /// Baseline-side lines of `Deleted` and `Modified` ranges.
    pub deleted: usize,
    /// Number of `Modified` ranges.
    pub modified_ranges: usize,
}

impl DiffStats {
    pub fn of(ranges: &[Range]) -> Self {
        ranges.iter().fold(Self::default(), |mut stats, range| {
            stats.inserted += range.current_len();
            stats.deleted += range.baseline_len();
            if range.kind == RangeKind::Modified {
                stats.modified_ranges += 1;
            }
            stats
        })
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }
}
