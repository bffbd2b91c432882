//! Replay scripts: a JSON list of edits applied to a tracked document.
//!
//! ```json
//! [
//!   { "op": "replace", "offset": 4, "len": 1, "text": "x" },
//!   { "op": "replace_lines", "line1": 2, "line2": 3, "lines": ["new"] },
//!   { "op": "bulk", "steps": [{ "op": "set_text", "text": "a\nb" }] },
//!   { "op": "rollback", "lines": [0, 1] },
//!   { "op": "set_baseline", "text": "a\nb" }
//! ]
//! ```

use std::collections::BTreeSet;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use lst_tracker::LineStatusTracker;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Replace `len` bytes at `offset`.
    Replace { offset: usize, len: usize, text: String },
    /// Replace lines `[line1, line2)`.
    ReplaceLines { line1: usize, line2: usize, lines: Vec<String> },
    /// Replace the whole document.
    SetText { text: String },
    /// Revert the ranges touching `lines`, or every range when omitted.
    Rollback {
        #[serde(default)]
        lines: Option<Vec<usize>>,
    },
    /// Run the nested steps as one bulk update.
    Bulk { steps: Vec<Step> },
    /// Swap the baseline.
    SetBaseline { text: String },
}

impl Step {
    /// Short label for progress output.
    pub fn label(&self) -> String {
        match self {
            Self::Replace { offset, len, .. } => format!("replace {len} byte(s) at {offset}"),
            Self::ReplaceLines { line1, line2, lines } => {
                format!("replace lines {line1}..{line2} with {} line(s)", lines.len())
            }
            Self::SetText { .. } => "set text".to_string(),
            Self::Rollback { lines: Some(lines) } => format!("rollback lines {lines:?}"),
            Self::Rollback { lines: None } => "rollback all".to_string(),
            Self::Bulk { steps } => format!("bulk update of {} step(s)", steps.len()),
            Self::SetBaseline { .. } => "set baseline".to_string(),
        }
    }

    pub fn apply(&self, tracker: &LineStatusTracker) -> anyhow::Result<()> {
        let document = tracker.document();
        match self {
            Self::Replace { offset, len, text } => document
                .replace(*offset, *len, text)
                .with_context(|| format!("replacing {len} byte(s) at {offset}"))?,
            Self::ReplaceLines { line1, line2, lines } => document
                .replace_lines(*line1, *line2, lines.as_slice())
                .with_context(|| format!("replacing lines {line1}..{line2}"))?,
            Self::SetText { text } => document.set_text(text).context("setting text")?,
            Self::Rollback { lines: Some(lines) } => {
                let lines: BTreeSet<usize> = lines.iter().copied().collect();
                tracker.rollback_lines(&lines).context("rolling back lines")?;
            }
            Self::Rollback { lines: None } => {
                let ranges = tracker
                    .ranges()
                    .context("tracker has no valid ranges to roll back")?;
                tracker.rollback_ranges(&ranges).context("rolling back all ranges")?;
            }
            Self::Bulk { steps } => {
                tracker.start_bulk_update();
                let result = steps.iter().try_for_each(|step| step.apply(tracker));
                tracker.finish_bulk_update();
                result?;
            }
            Self::SetBaseline { text } => tracker.set_baseline(text),
        }
        Ok(())
    }
}

pub fn parse(source: &str) -> anyhow::Result<Vec<Step>> {
    serde_json::from_str(source).context("parsing replay script")
}
