use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// How lines are compared when building ranges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// Exact line comparison; one range per changed hunk.
    #[default]
    Simple,
    /// Whitespace-aware hunks with inner ranges separating whitespace-only
    /// lines from real changes.
    Smart,
}

/// Size and time budget for a single diff computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffLimits {
    /// Maximum number of lines (current plus baseline) left in the changed
    /// window once the common prefix and suffix are stripped.
    pub max_window_lines: usize,
    /// Maximum wall-clock time for one computation. `None` disables the check.
    pub timeout: Option<Duration>,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            max_window_lines: 200_000,
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl DiffLimits {
    /// No limits at all. Intended for tests and offline tools.
    pub fn unlimited() -> Self {
        Self {
            max_window_lines: usize::MAX,
            timeout: None,
        }
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }
}
