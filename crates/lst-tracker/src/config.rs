use serde::{Deserialize, Serialize};

use lst_diff::{DiffLimits, DiffMode};

use crate::error::{TrackerError, TrackerResult};

/// When an incremental update may pull neighbouring ranges into the
/// recomputed window.
///
/// Pulling a neighbour in lets an edit next to an existing change merge with
/// it instead of producing a second range right beside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GapPolicy {
    /// Only ranges that touch or overlap the edited window are recomputed.
    Never,
    /// Also pull in ranges separated from the window by at most `max_gap`
    /// lines, all of them blank or whitespace-only.
    BlankLines { max_gap: usize },
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self::BlankLines { max_gap: 3 }
    }
}

/// Configuration for a [`LineStatusTracker`](crate::LineStatusTracker).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Comparison mode passed to the differencer.
    pub mode: DiffMode,
    /// Size and time budget for every diff the tracker runs.
    pub limits: DiffLimits,
    /// Neighbour expansion rule for incremental updates.
    pub gap_policy: GapPolicy,
}

impl TrackerConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> TrackerResult<Self> {
        toml::from_str(source).map_err(|e| TrackerError::Config(e.to_string()))
    }

    /// Smart mode with default limits.
    pub fn smart() -> Self {
        Self {
            mode: DiffMode::Smart,
            ..Default::default()
        }
    }
}
