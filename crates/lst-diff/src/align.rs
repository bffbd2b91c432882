//! Line alignment: Myers diff over interned line keys.
//!
//! Lines are mapped to integer keys first so the comparison policy (exact or
//! whitespace-insensitive) is decided once per line, and so the diff itself
//! only compares `u32`s. The common prefix and suffix are stripped before the
//! budget is checked; only the remaining window has to fit the limits.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range as Span;
use std::time::{Duration, Instant};

use similar::algorithms::{myers, DiffHook};

use crate::cancel::CancellationToken;
use crate::error::{DiffError, DiffResult};

/// One piece of an alignment. Segments cover both sides completely and in
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Equal { old: usize, new: usize, len: usize },
    Changed { old: Span<usize>, new: Span<usize> },
}

/// Budget shared by every pass of one computation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Budget {
    pub max_window_lines: usize,
    pub timeout: Option<Duration>,
    pub deadline: Option<Instant>,
}

/// Map both sides to integer keys using the same table.
pub(crate) fn intern<K, I, J>(old: I, new: J) -> (Vec<u32>, Vec<u32>)
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
    J: IntoIterator<Item = K>,
{
    let mut table: HashMap<K, u32> = HashMap::new();
    let mut key_of = |line: K| {
        let next = table.len() as u32;
        *table.entry(line).or_insert(next)
    };
    let old_keys = old.into_iter().map(&mut key_of).collect();
    let new_keys = new.into_iter().map(&mut key_of).collect();
    (old_keys, new_keys)
}

/// Align `old` against `new`, returning segments that cover both sides.
pub(crate) fn align(
    old: &[u32],
    new: &[u32],
    budget: Budget,
    cancel: &CancellationToken,
) -> DiffResult<Vec<Segment>> {
    cancel.check()?;

    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_window = prefix..old.len() - suffix;
    let new_window = prefix..new.len() - suffix;
    let window_lines = old_window.len() + new_window.len();
    if window_lines > budget.max_window_lines {
        tracing::debug!(
            window_lines,
            limit = budget.max_window_lines,
            "changed window exceeds diff budget"
        );
        return Err(DiffError::TooBig {
            window_lines,
            limit: budget.max_window_lines,
        });
    }

    let mut collector = SegmentCollector::new(cancel);
    if prefix > 0 {
        collector.push_equal(0, 0, prefix);
    }
    if window_lines > 0 {
        myers::diff_deadline(
            &mut collector,
            old,
            old_window.clone(),
            new,
            new_window.clone(),
            budget.deadline,
        )?;
        if let (Some(deadline), Some(timeout)) = (budget.deadline, budget.timeout) {
            if Instant::now() > deadline {
                return Err(DiffError::DeadlineExceeded { budget: timeout });
            }
        }
    }
    collector.flush();
    if suffix > 0 {
        collector.push_equal(old_window.end, new_window.end, suffix);
    }
    Ok(collector.segments)
}

/// [`DiffHook`] that folds Myers output into maximal equal/changed segments
/// and checks for cancellation on every callback.
struct SegmentCollector<'a> {
    cancel: &'a CancellationToken,
    segments: Vec<Segment>,
    pending: Option<(Span<usize>, Span<usize>)>,
}

impl<'a> SegmentCollector<'a> {
    fn new(cancel: &'a CancellationToken) -> Self {
        Self {
            cancel,
            segments: Vec::new(),
            pending: None,
        }
    }

    fn push_equal(&mut self, old: usize, new: usize, len: usize) {
        self.flush();
        if let Some(Segment::Equal {
            old: last_old,
            new: last_new,
            len: last_len,
        }) = self.segments.last_mut()
        {
            if *last_old + *last_len == old && *last_new + *last_len == new {
                *last_len += len;
                return;
            }
        }
        self.segments.push(Segment::Equal { old, new, len });
    }

    fn push_change(&mut self, old: Span<usize>, new: Span<usize>) {
        match &mut self.pending {
            Some((pending_old, pending_new))
                if pending_old.end == old.start && pending_new.end == new.start =>
            {
                pending_old.end = old.end;
                pending_new.end = new.end;
            }
            _ => {
                self.flush();
                self.pending = Some((old, new));
            }
        }
    }

    fn flush(&mut self) {
        if let Some((old, new)) = self.pending.take() {
            self.segments.push(Segment::Changed { old, new });
        }
    }
}

impl DiffHook for SegmentCollector<'_> {
    type Error = DiffError;

    fn equal(&mut self, old_index: usize, new_index: usize, len: usize) -> DiffResult<()> {
        self.cancel.check()?;
        self.push_equal(old_index, new_index, len);
        Ok(())
    }

    fn delete(&mut self, old_index: usize, old_len: usize, new_index: usize) -> DiffResult<()> {
        self.cancel.check()?;
        self.push_change(old_index..old_index + old_len, new_index..new_index);
        Ok(())
    }

    fn insert(&mut self, old_index: usize, new_index: usize, new_len: usize) -> DiffResult<()> {
        self.cancel.check()?;
        self.push_change(old_index..old_index, new_index..new_index + new_len);
        Ok(())
    }

    fn finish(&mut self) -> DiffResult<()> {
        self.flush();
        Ok(())
    }
}
