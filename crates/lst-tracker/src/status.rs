use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a tracker currently refuses to answer range queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// Inside `start_bulk_update`/`finish_bulk_update`.
    Bulk,
    /// A rollback is writing to the document.
    Rollback,
    /// The last diff exceeded its limits.
    Oversized,
}

/// Lifecycle state of a tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum TrackerStatus {
    /// No baseline has been set yet.
    Uninitialized,
    /// Ranges are installed and match the document.
    Initialized,
    /// Edits are pending; the next read on the owning thread recomputes.
    Dirty,
    /// Temporarily not tracking.
    Suppressed(SuppressReason),
    /// Permanently detached from the document.
    Released,
}

impl TrackerStatus {
    /// Returns `true` if range queries are answered without recomputation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Initialized)
    }
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::Dirty => write!(f, "dirty"),
            Self::Suppressed(SuppressReason::Bulk) => write!(f, "suppressed (bulk update)"),
            Self::Suppressed(SuppressReason::Rollback) => write!(f, "suppressed (rollback)"),
            Self::Suppressed(SuppressReason::Oversized) => write!(f, "suppressed (too big)"),
            Self::Released => write!(f, "released"),
        }
    }
}
