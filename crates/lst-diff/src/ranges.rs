//! Range building: turn an alignment into [`Range`]s.
//!
//! Simple mode reports every hunk of an exact line comparison. Smart mode
//! aligns the sides ignoring whitespace, widens hunks over lines that only
//! matched because whitespace was ignored, and then classifies the lines of
//! each modified hunk with a second whitespace-insensitive pass.

use std::ops::Range as Span;

use lst_types::{whitespace_key, InnerRange, Range, RangeKind};

use crate::align::{align, intern, Budget, Segment};
use crate::cancel::CancellationToken;
use crate::config::{DiffLimits, DiffMode};
use crate::error::DiffResult;

/// Compute the changed ranges between `current` and `baseline`.
///
/// Pure: safe to call from any thread. Fails with
/// [`DiffError::TooBig`](crate::DiffError::TooBig) or
/// [`DiffError::DeadlineExceeded`](crate::DiffError::DeadlineExceeded) when the
/// input exceeds `limits`, and with
/// [`DiffError::Cancelled`](crate::DiffError::Cancelled) when `cancel` fires.
pub fn compute_ranges<C, B>(
    current: &[C],
    baseline: &[B],
    mode: DiffMode,
    limits: &DiffLimits,
    cancel: &CancellationToken,
) -> DiffResult<Vec<Range>>
where
    C: AsRef<str>,
    B: AsRef<str>,
{
    let budget = Budget {
        max_window_lines: limits.max_window_lines,
        timeout: limits.timeout,
        deadline: limits.deadline(),
    };
    let ranges = match mode {
        DiffMode::Simple => simple_ranges(current, baseline, budget, cancel)?,
        DiffMode::Smart => smart_ranges(current, baseline, budget, cancel)?,
    };
    tracing::trace!(
        current_lines = current.len(),
        baseline_lines = baseline.len(),
        ?mode,
        ranges = ranges.len(),
        "computed ranges"
    );
    Ok(ranges)
}

fn simple_ranges<C, B>(
    current: &[C],
    baseline: &[B],
    budget: Budget,
    cancel: &CancellationToken,
) -> DiffResult<Vec<Range>>
where
    C: AsRef<str>,
    B: AsRef<str>,
{
    let (old, new) = intern(
        baseline.iter().map(AsRef::as_ref),
        current.iter().map(AsRef::as_ref),
    );
    let segments = align(&old, &new, budget, cancel)?;
    Ok(segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Changed { old, new } => Some(Range::new(new.start, new.end, old.start, old.end)),
            Segment::Equal { .. } => None,
        })
        .collect())
}

/// A changed block in baseline (`old`) and current (`new`) coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Hunk {
    old: Span<usize>,
    new: Span<usize>,
}

fn smart_ranges<C, B>(
    current: &[C],
    baseline: &[B],
    budget: Budget,
    cancel: &CancellationToken,
) -> DiffResult<Vec<Range>>
where
    C: AsRef<str>,
    B: AsRef<str>,
{
    let (old, new) = intern(
        baseline.iter().map(|line| whitespace_key(line.as_ref())),
        current.iter().map(|line| whitespace_key(line.as_ref())),
    );
    let segments = align(&old, &new, budget, cancel)?;
    let hunks = widen_over_whitespace_matches(segments, current, baseline);

    let mut ranges = Vec::with_capacity(hunks.len());
    for hunk in hunks {
        cancel.check()?;
        let range = Range::new(hunk.new.start, hunk.new.end, hunk.old.start, hunk.old.end);
        let range = if range.kind == RangeKind::Modified {
            let inner = inner_ranges(&old[hunk.old.clone()], &new[hunk.new.clone()], budget, cancel)?;
            range.with_inner(inner)
        } else {
            range
        };
        ranges.push(range);
    }
    Ok(ranges)
}

/// Split whitespace-insensitive equal runs into exact matches and
/// whitespace-only changes, merging the latter into adjacent hunks so no hunk
/// starts or ends next to a line that only matched because whitespace was
/// ignored.
fn widen_over_whitespace_matches<C, B>(segments: Vec<Segment>, current: &[C], baseline: &[B]) -> Vec<Hunk>
where
    C: AsRef<str>,
    B: AsRef<str>,
{
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut push = |old: Span<usize>, new: Span<usize>| {
        if let Some(last) = hunks.last_mut() {
            if last.old.end == old.start && last.new.end == new.start {
                last.old.end = old.end;
                last.new.end = new.end;
                return;
            }
        }
        hunks.push(Hunk { old, new });
    };

    for segment in segments {
        match segment {
            Segment::Changed { old, new } => push(old, new),
            Segment::Equal { old, new, len } => {
                for k in 0..len {
                    if baseline[old + k].as_ref() != current[new + k].as_ref() {
                        push(old + k..old + k + 1, new + k..new + k + 1);
                    }
                }
            }
        }
    }
    hunks
}

/// Classify the lines of one modified hunk. Coordinates are relative to the
/// hunk start on each side.
fn inner_ranges(
    old: &[u32],
    new: &[u32],
    budget: Budget,
    cancel: &CancellationToken,
) -> DiffResult<Vec<InnerRange>> {
    let segments = align(old, new, budget, cancel)?;
    Ok(segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Equal { old, new, len } => {
                InnerRange::new(new, new + len, old, old + len, RangeKind::Equal)
            }
            Segment::Changed { old, new } => {
                let kind = RangeKind::from_lengths(new.len(), old.len()).unwrap_or(RangeKind::Equal);
                InnerRange::new(new.start, new.end, old.start, old.end, kind)
            }
        })
        .collect())
}
