//! Lock-protected tracker state and the update algorithms that run on it.

use std::mem;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use tracing::{debug, info, warn};

use lst_diff::{compute_ranges, CancellationToken, DiffError};
use lst_text::{Document, EditEvent};
use lst_types::{is_blank, split_lines, EditSpan, Range, RangeId};

use crate::config::{GapPolicy, TrackerConfig};
use crate::dirty::DirtyRange;
use crate::error::{TrackerError, TrackerResult};
use crate::host::HostEvent;
use crate::status::{SuppressReason, TrackerStatus};

/// Line span of an edit captured in `before_edit`.
#[derive(Clone, Copy, Debug)]
struct PendingEdit {
    line1: usize,
    line2: usize,
    total_lines: usize,
}

/// One document write of a rollback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RollbackStep {
    pub line1: usize,
    pub line2: usize,
    pub lines: Vec<String>,
}

/// Writes to perform, in order, and the window they dirty.
#[derive(Clone, Debug)]
pub(crate) struct RollbackPlan {
    pub steps: Vec<RollbackStep>,
    pub window: DirtyRange,
}

pub(crate) struct TrackerState {
    config: TrackerConfig,
    baseline: Arc<[String]>,
    ranges: Vec<Range>,
    dirty: Option<DirtyRange>,
    pending: Option<PendingEdit>,
    initialized: bool,
    released: bool,
    oversized: bool,
    bulk_depth: usize,
    /// Thread writing a rollback, whose own edits are not tracked.
    rollback_thread: Option<ThreadId>,
    /// Set when edits could not be tracked incrementally.
    needs_reinstall: bool,
    next_id: u64,
    events: Vec<HostEvent>,
}

impl TrackerState {
    pub(crate) fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            baseline: Arc::from(Vec::new()),
            ranges: Vec::new(),
            dirty: None,
            pending: None,
            initialized: false,
            released: false,
            oversized: false,
            bulk_depth: 0,
            rollback_thread: None,
            needs_reinstall: false,
            next_id: 1,
            events: Vec::new(),
        }
    }

    pub(crate) fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub(crate) fn baseline(&self) -> Arc<[String]> {
        Arc::clone(&self.baseline)
    }

    pub(crate) fn status(&self) -> TrackerStatus {
        if self.released {
            TrackerStatus::Released
        } else if !self.initialized {
            TrackerStatus::Uninitialized
        } else if self.oversized {
            TrackerStatus::Suppressed(SuppressReason::Oversized)
        } else if self.rollback_thread.is_some() {
            TrackerStatus::Suppressed(SuppressReason::Rollback)
        } else if self.bulk_depth > 0 {
            TrackerStatus::Suppressed(SuppressReason::Bulk)
        } else if self.dirty.is_some() || self.pending.is_some() || self.needs_reinstall {
            TrackerStatus::Dirty
        } else {
            TrackerStatus::Initialized
        }
    }

    pub(crate) fn is_operational(&self) -> bool {
        self.initialized && !self.released
    }

    /// The installed ranges, if they currently describe the document.
    pub(crate) fn valid_ranges(&self) -> Option<&[Range]> {
        self.status().is_valid().then_some(self.ranges.as_slice())
    }

    pub(crate) fn take_events(&mut self) -> Vec<HostEvent> {
        mem::take(&mut self.events)
    }

    // ---- Edit notifications ----

    fn is_own_rollback(&self) -> bool {
        self.rollback_thread == Some(thread::current().id())
    }

    /// Whether edits are folded into the dirty window right now.
    fn tracks_edits(&self) -> bool {
        self.is_operational() && !self.oversized && self.bulk_depth == 0 && self.rollback_thread.is_none()
    }

    pub(crate) fn before_edit(&mut self, document: &Document, event: &EditEvent) {
        if !self.is_operational() || self.is_own_rollback() {
            return;
        }
        if !self.tracks_edits() {
            self.needs_reinstall = true;
            return;
        }
        if self.pending.take().is_some() {
            warn!("edit started before the previous one finished; scheduling full rebuild");
            self.needs_reinstall = true;
        }
        let lines = document.line_of_offset(event.offset).and_then(|line1| {
            let line2 = document.line_of_offset(event.offset + event.old_len)? + 1;
            Ok((line1, line2))
        });
        match lines {
            Ok((line1, line2)) => {
                self.pending = Some(PendingEdit {
                    line1,
                    line2,
                    total_lines: document.line_count(),
                });
            }
            Err(error) => {
                warn!(%error, "edit outside the document; scheduling full rebuild");
                self.needs_reinstall = true;
            }
        }
    }

    pub(crate) fn after_edit(&mut self, document: &Document, event: &EditEvent) {
        if !self.is_operational() || self.is_own_rollback() {
            return;
        }
        if !self.tracks_edits() {
            self.pending = None;
            self.needs_reinstall = true;
            return;
        }
        let Some(pending) = self.pending.take() else {
            warn!("edit finished without a matching start; scheduling full rebuild");
            self.needs_reinstall = true;
            return;
        };
        if self.needs_reinstall {
            return;
        }
        match edit_span(document, event, pending) {
            Ok(span) => {
                self.dirty = Some(match self.dirty {
                    Some(dirty) => dirty.merge(span),
                    None => DirtyRange::new(span, pending.total_lines),
                });
            }
            Err(error) => {
                warn!(%error, "edit bookkeeping failed; scheduling full rebuild");
                self.dirty = None;
                self.needs_reinstall = true;
            }
        }
    }

    // ---- Baseline and full rebuilds ----

    pub(crate) fn set_baseline(&mut self, text: &str, document: &Document, cancel: &CancellationToken) {
        if self.released {
            return;
        }
        self.baseline = Arc::from(split_lines(text));
        let disposed = mem::take(&mut self.ranges);
        self.queue_disposed(disposed);
        self.dirty = None;
        self.initialized = true;
        info!(baseline_lines = self.baseline.len(), "baseline set");

        if self.bulk_depth > 0 {
            self.needs_reinstall = true;
            return;
        }
        self.reinstall(document, cancel);
    }

    /// Recompute every range from scratch. Also the way out of the oversized
    /// state.
    pub(crate) fn reinstall(&mut self, document: &Document, cancel: &CancellationToken) {
        if !self.is_operational() || self.bulk_depth > 0 || self.rollback_thread.is_some() {
            return;
        }
        let current = document.lines();
        match compute_ranges(&current, &self.baseline, self.config.mode, &self.config.limits, cancel) {
            Ok(ranges) => {
                self.dirty = None;
                self.needs_reinstall = false;
                self.leave_oversized();
                self.replace_all(ranges);
                debug!(ranges = self.ranges.len(), "ranges rebuilt");
            }
            Err(error) if error.is_too_big() => self.enter_oversized(&error),
            Err(error) => {
                debug!(%error, "rebuild interrupted; will retry");
                self.needs_reinstall = true;
            }
        }
    }

    fn replace_all(&mut self, ranges: Vec<Range>) {
        if same_ranges(&self.ranges, &ranges) {
            return;
        }
        let fresh = self.assign_ids(ranges);
        let disposed = mem::replace(&mut self.ranges, fresh.clone());
        self.queue_disposed(disposed);
        self.queue_installed(fresh);
    }

    fn enter_oversized(&mut self, error: &DiffError) {
        warn!(%error, "document too big to track; suspending");
        let disposed = mem::take(&mut self.ranges);
        self.queue_disposed(disposed);
        self.dirty = None;
        self.needs_reinstall = false;
        if !self.oversized {
            self.oversized = true;
            self.events.push(HostEvent::TooBig(true));
        }
    }

    fn leave_oversized(&mut self) {
        if self.oversized {
            info!("document fits the diff limits again; tracking resumed");
            self.oversized = false;
            self.events.push(HostEvent::TooBig(false));
        }
    }

    // ---- Bulk updates ----

    pub(crate) fn start_bulk_update(&mut self) {
        if !self.released {
            self.bulk_depth += 1;
            self.dirty = None;
            self.pending = None;
            self.needs_reinstall = true;
        }
    }

    pub(crate) fn finish_bulk_update(&mut self, document: &Document, cancel: &CancellationToken) {
        if self.bulk_depth == 0 {
            warn!("finish_bulk_update without a matching start");
            return;
        }
        self.bulk_depth -= 1;
        if self.bulk_depth == 0 {
            self.reinstall(document, cancel);
        }
    }

    // ---- Incremental update ----

    /// Bring the ranges up to date with the document.
    pub(crate) fn flush(&mut self, document: &Document, cancel: &CancellationToken) {
        if self.oversized && self.needs_reinstall {
            // Edits since the last attempt may have brought the document back
            // within the limits.
            self.reinstall(document, cancel);
            return;
        }
        if !self.tracks_edits() || self.pending.is_some() {
            return;
        }
        if self.needs_reinstall {
            self.reinstall(document, cancel);
            return;
        }
        let Some(dirty) = self.dirty else {
            return;
        };
        match self.update_window(document, dirty, cancel) {
            Ok(()) => self.dirty = None,
            Err(TrackerError::Diff(DiffError::Cancelled)) => {
                debug!("incremental update cancelled; window stays dirty");
            }
            Err(TrackerError::Diff(error)) => self.enter_oversized(&error),
            Err(error) => {
                warn!(%error, "incremental update failed; rebuilding all ranges");
                self.reinstall(document, cancel);
            }
        }
    }

    fn update_window(&mut self, document: &Document, dirty: DirtyRange, cancel: &CancellationToken) -> TrackerResult<()> {
        let total = document.line_count();
        if dirty.expected_line_count() != total as isize {
            return Err(TrackerError::Inconsistent(format!(
                "document has {total} lines but edits account for {}",
                dirty.expected_line_count()
            )));
        }
        let (w1, w2) = dirty
            .original_window()
            .ok_or_else(|| TrackerError::Inconsistent(format!("invalid dirty window {dirty:?}")))?;
        let shift = dirty.line_shift;

        let mut start = self.ranges.partition_point(|r| r.line2 < w1);
        let mut end = self.ranges.partition_point(|r| r.line1 <= w2).max(start);
        if let GapPolicy::BlankLines { max_gap } = self.config.gap_policy {
            (start, end) = self.expand_over_blank_gaps(document, (start, end), (w1, w2), shift, max_gap)?;
        }

        let (c1, e) = self.changed_bounds(start, end, w1, w2);
        let inconsistent = || TrackerError::Inconsistent(format!("window [{c1}, {e}) out of bounds"));
        let v1 = to_baseline(c1, self.ranges[..start].last()).ok_or_else(inconsistent)?;
        let v2 = to_baseline(e, self.ranges[..end].last()).ok_or_else(inconsistent)?;
        let c2 = e.checked_add_signed(shift).ok_or_else(inconsistent)?;
        if c1 > c2 || c2 > total || v1 > v2 || v2 > self.baseline.len() {
            return Err(inconsistent());
        }

        let current = document.lines_in(c1, c2)?;
        let fresh = compute_ranges(
            &current,
            &self.baseline[v1..v2],
            self.config.mode,
            &self.config.limits,
            cancel,
        )?;
        debug!(c1, c2, v1, v2, replaced = end - start, fresh = fresh.len(), "recomputed dirty window");
        let fresh = fresh.into_iter().map(|r| r.offset(c1, v1)).collect();
        self.splice(start, end, fresh, shift, total)
    }

    /// Window covering the dirty lines and the ranges in `start..end`, in the
    /// coordinates of the installed ranges.
    fn changed_bounds(&self, start: usize, end: usize, w1: usize, w2: usize) -> (usize, usize) {
        let changed = &self.ranges[start..end];
        let c1 = changed.first().map_or(w1, |r| r.line1.min(w1));
        let e = changed.last().map_or(w2, |r| r.line2.max(w2));
        (c1, e)
    }

    fn expand_over_blank_gaps(
        &self,
        document: &Document,
        (mut start, mut end): (usize, usize),
        (w1, w2): (usize, usize),
        shift: isize,
        max_gap: usize,
    ) -> TrackerResult<(usize, usize)> {
        while start > 0 {
            let (c1, _) = self.changed_bounds(start, end, w1, w2);
            let gap_start = self.ranges[start - 1].line2;
            if c1.saturating_sub(gap_start) > max_gap || !all_blank(&document.lines_in(gap_start, c1)?) {
                break;
            }
            start -= 1;
        }
        while end < self.ranges.len() {
            let (_, e) = self.changed_bounds(start, end, w1, w2);
            let gap_end = self.ranges[end].line1;
            if gap_end.saturating_sub(e) > max_gap {
                break;
            }
            // Lines after the window have already moved by `shift`.
            let (from, to) = match (e.checked_add_signed(shift), gap_end.checked_add_signed(shift)) {
                (Some(from), Some(to)) if from <= to => (from, to),
                _ => break,
            };
            if !all_blank(&document.lines_in(from, to)?) {
                break;
            }
            end += 1;
        }
        Ok((start, end))
    }

    /// Replace `ranges[start..end]` with `fresh` and shift everything after
    /// by `shift`. Identities survive when the replaced ranges are unchanged.
    fn splice(&mut self, start: usize, end: usize, fresh: Vec<Range>, shift: isize, total: usize) -> TrackerResult<()> {
        let unchanged = same_ranges(&self.ranges[start..end], &fresh);
        let middle = if unchanged {
            self.ranges[start..end].to_vec()
        } else {
            self.assign_ids(fresh)
        };

        let mut updated = Vec::with_capacity(self.ranges.len() - (end - start) + middle.len());
        updated.extend_from_slice(&self.ranges[..start]);
        updated.extend(middle.iter().cloned());
        updated.extend(self.ranges[end..].iter().map(|r| r.shifted(shift)));
        check_ranges(&updated, total, self.baseline.len())?;

        if !unchanged {
            let disposed = self.ranges[start..end].to_vec();
            self.queue_disposed(disposed);
            self.queue_installed(middle);
        }
        self.ranges = updated;
        Ok(())
    }

    fn assign_ids(&mut self, ranges: Vec<Range>) -> Vec<Range> {
        ranges
            .into_iter()
            .map(|range| {
                let id = RangeId(self.next_id);
                self.next_id += 1;
                range.with_id(id)
            })
            .collect()
    }

    fn queue_installed(&mut self, ranges: Vec<Range>) {
        if !ranges.is_empty() {
            self.events.push(HostEvent::Installed(ranges));
        }
    }

    fn queue_disposed(&mut self, ranges: Vec<Range>) {
        if !ranges.is_empty() {
            self.events.push(HostEvent::Disposed(ranges));
        }
    }

    // ---- Rollback ----

    /// Plan restoring the installed ranges picked by `select` to their
    /// baseline text, and mark the rollback as running on this thread.
    ///
    /// `select` sees the installed ranges; only the ones it returns that still
    /// match by identity and lines are restored. Returns `None` when nothing
    /// applies, and [`TrackerError::NotValid`] when the installed ranges do
    /// not describe the document.
    pub(crate) fn begin_rollback(
        &mut self,
        select: impl FnOnce(&[Range]) -> Vec<Range>,
        document: &Document,
    ) -> TrackerResult<Option<RollbackPlan>> {
        if self.released {
            return Ok(None);
        }
        let status = self.status();
        let ranges = self.valid_ranges().ok_or(TrackerError::NotValid(status))?;
        let selected = select(ranges);
        let chosen: Vec<&Range> = ranges
            .iter()
            .filter(|r| selected.iter().any(|s| s.id == r.id && s.same_lines(r)))
            .collect();
        let (Some(&first), Some(&last)) = (chosen.first(), chosen.last()) else {
            return Ok(None);
        };

        let mut shift = 0isize;
        let mut steps = Vec::with_capacity(chosen.len());
        for range in &chosen {
            steps.push(RollbackStep {
                line1: range.line1.saturating_add_signed(shift),
                line2: range.line2.saturating_add_signed(shift),
                lines: self.baseline[range.vcs_line1..range.vcs_line2].to_vec(),
            });
            shift -= range.line_shift();
        }
        let window = DirtyRange {
            line1: first.line1,
            line2: last.line2.saturating_add_signed(shift),
            line_shift: shift,
            total_lines_before_batch: document.line_count(),
        };
        debug!(ranges = steps.len(), shift, "rolling back ranges");
        self.rollback_thread = Some(thread::current().id());
        Ok(Some(RollbackPlan { steps, window }))
    }

    /// Finish a rollback. `written` is `false` if a document write failed
    /// part-way.
    pub(crate) fn finish_rollback(
        &mut self,
        window: DirtyRange,
        written: bool,
        document: &Document,
        cancel: &CancellationToken,
    ) {
        self.rollback_thread = None;
        if !self.is_operational() {
            return;
        }
        if written && !self.needs_reinstall {
            self.dirty = Some(window);
        } else {
            self.needs_reinstall = true;
        }
        self.flush(document, cancel);
    }

    // ---- Release ----

    pub(crate) fn release(&mut self) {
        if self.released {
            return;
        }
        let disposed = mem::take(&mut self.ranges);
        self.queue_disposed(disposed);
        self.released = true;
        self.dirty = None;
        self.pending = None;
        self.needs_reinstall = false;
        info!("tracker released");
    }
}

fn edit_span(document: &Document, event: &EditEvent, pending: PendingEdit) -> TrackerResult<EditSpan> {
    let after_line2 = document.line_of_offset(event.offset + event.new_len)? + 1;
    let span = EditSpan::new(pending.line1, pending.line2, pending.line1, after_line2)
        .map_err(|e| TrackerError::Inconsistent(e.to_string()))?;
    let actual = document.line_count() as isize - pending.total_lines as isize;
    if actual != span.line_shift() {
        return Err(TrackerError::Inconsistent(format!(
            "edit changed the line count by {actual}, its span accounts for {}",
            span.line_shift()
        )));
    }
    Ok(span)
}

/// Map a current-side line lying after `last` (or before any range) to the
/// baseline.
fn to_baseline(line: usize, last: Option<&Range>) -> Option<usize> {
    let delta = last.map_or(0, |r| r.line2 as isize - r.vcs_line2 as isize);
    line.checked_add_signed(-delta)
}

fn all_blank(lines: &[String]) -> bool {
    lines.iter().all(|line| is_blank(line))
}

fn same_ranges(old: &[Range], new: &[Range]) -> bool {
    old.len() == new.len() && old.iter().zip(new).all(|(a, b)| a.same_lines(b))
}

/// Ranges must be sorted, non-overlapping on both sides and inside both texts.
fn check_ranges(ranges: &[Range], current_lines: usize, baseline_lines: usize) -> TrackerResult<()> {
    let malformed = ranges
        .iter()
        .find(|r| r.line1 > r.line2 || r.vcs_line1 > r.vcs_line2 || r.line2 > current_lines || r.vcs_line2 > baseline_lines);
    if let Some(range) = malformed {
        return Err(TrackerError::Inconsistent(format!("range {range} out of bounds")));
    }
    for pair in ranges.windows(2) {
        if pair[0].line2 > pair[1].line1 || pair[0].vcs_line2 > pair[1].vcs_line1 {
            return Err(TrackerError::Inconsistent(format!(
                "ranges {} and {} overlap",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(baseline: &str, current: &str, config: TrackerConfig) -> (TrackerState, Document) {
        let document = Document::new(current);
        let mut state = TrackerState::new(config);
        state.set_baseline(baseline, &document, &CancellationToken::new());
        (state, document)
    }

    fn edit(state: &mut TrackerState, document: &Document, offset: usize, old_len: usize, text: &str) {
        let event = EditEvent {
            offset,
            old_len,
            new_len: text.len(),
        };
        state.before_edit(document, &event);
        document.replace(offset, old_len, text).unwrap();
        state.after_edit(document, &event);
    }

    fn spans(state: &TrackerState) -> Vec<(usize, usize, usize, usize)> {
        state
            .ranges
            .iter()
            .map(|r| (r.line1, r.line2, r.vcs_line1, r.vcs_line2))
            .collect()
    }

    // ---- Status ----

    #[test]
    fn status_transitions() {
        let document = Document::new("a");
        let mut state = TrackerState::new(TrackerConfig::default());
        assert_eq!(state.status(), TrackerStatus::Uninitialized);

        state.set_baseline("a", &document, &CancellationToken::new());
        assert_eq!(state.status(), TrackerStatus::Initialized);

        state.start_bulk_update();
        assert_eq!(state.status(), TrackerStatus::Suppressed(SuppressReason::Bulk));
        state.finish_bulk_update(&document, &CancellationToken::new());
        assert_eq!(state.status(), TrackerStatus::Initialized);

        state.release();
        assert_eq!(state.status(), TrackerStatus::Released);
    }

    // ---- Incremental updates ----

    #[test]
    fn edit_marks_dirty_until_flush() {
        let (mut state, document) = state_with("a\nb\nc", "a\nb\nc", TrackerConfig::default());
        edit(&mut state, &document, 2, 1, "X");
        assert_eq!(state.status(), TrackerStatus::Dirty);
        assert_eq!(state.dirty.map(|d| (d.line1, d.line2, d.line_shift)), Some((1, 2, 0)));

        state.flush(&document, &CancellationToken::new());
        assert_eq!(state.status(), TrackerStatus::Initialized);
        assert_eq!(spans(&state), vec![(1, 2, 1, 2)]);
    }

    #[test]
    fn ranges_after_the_window_shift() {
        let (mut state, document) = state_with("a\nb\nc\nd", "a\nb\nc\nX", TrackerConfig::default());
        assert_eq!(spans(&state), vec![(3, 4, 3, 4)]);
        let id = state.ranges[0].id;

        // Insert a line at the top.
        edit(&mut state, &document, 0, 0, "new\n");
        state.flush(&document, &CancellationToken::new());
        assert_eq!(spans(&state), vec![(0, 1, 0, 0), (4, 5, 3, 4)]);
        assert_eq!(state.ranges[1].id, id);
    }

    #[test]
    fn cancelled_update_keeps_window() {
        let (mut state, document) = state_with("a\nb", "a\nb", TrackerConfig::default());
        edit(&mut state, &document, 0, 1, "X");
        let cancel = CancellationToken::new();
        cancel.cancel();
        state.flush(&document, &cancel);
        assert_eq!(state.status(), TrackerStatus::Dirty);
        assert!(state.ranges.is_empty());

        state.flush(&document, &CancellationToken::new());
        assert_eq!(spans(&state), vec![(0, 1, 0, 1)]);
    }

    #[test]
    fn inconsistent_line_count_rebuilds() {
        let (mut state, document) = state_with("a\nb", "a\nb", TrackerConfig::default());
        edit(&mut state, &document, 0, 1, "X");
        // An edit the tracker never heard about.
        document.replace(0, 0, "hidden\n").unwrap();
        state.flush(&document, &CancellationToken::new());
        assert_eq!(state.status(), TrackerStatus::Initialized);
        assert_eq!(spans(&state), vec![(0, 2, 0, 1)]);
    }

    #[test]
    fn unmatched_after_edit_forces_rebuild() {
        let (mut state, document) = state_with("a", "a", TrackerConfig::default());
        let event = EditEvent {
            offset: 1,
            old_len: 0,
            new_len: 1,
        };
        document.replace(1, 0, "b").unwrap();
        state.after_edit(&document, &event);
        assert!(state.needs_reinstall);
        state.flush(&document, &CancellationToken::new());
        assert_eq!(spans(&state), vec![(0, 1, 0, 1)]);
    }

    #[test]
    fn blank_gap_pulls_neighbour_into_window() {
        let baseline = "a\nb\n\nc\nd";
        let config = TrackerConfig {
            gap_policy: GapPolicy::BlankLines { max_gap: 1 },
            ..Default::default()
        };
        let (mut state, document) = state_with(baseline, "a\nX\n\nc\nd", config);
        assert_eq!(spans(&state), vec![(1, 2, 1, 2)]);
        let neighbour = state.ranges[0].id;

        // Edit line 3; line 2 is blank, so the range on line 1 is recomputed too.
        edit(&mut state, &document, 5, 1, "Y");
        state.flush(&document, &CancellationToken::new());
        assert_eq!(spans(&state), vec![(1, 2, 1, 2), (3, 4, 3, 4)]);
        assert_ne!(state.ranges[0].id, neighbour);
    }

    #[test]
    fn never_policy_leaves_neighbour_alone() {
        let config = TrackerConfig {
            gap_policy: GapPolicy::Never,
            ..Default::default()
        };
        let (mut state, document) = state_with("a\nb\n\nc\nd", "a\nX\n\nc\nd", config);
        let neighbour = state.ranges[0].id;
        edit(&mut state, &document, 5, 1, "Y");
        state.flush(&document, &CancellationToken::new());
        assert_eq!(spans(&state), vec![(1, 2, 1, 2), (3, 4, 3, 4)]);
        assert_eq!(state.ranges[0].id, neighbour);
    }

    // ---- Events ----

    #[test]
    fn unchanged_recompute_fires_no_events() {
        let (mut state, document) = state_with("a\nb", "a\nX", TrackerConfig::default());
        state.take_events();
        // Retype the same character.
        edit(&mut state, &document, 2, 1, "X");
        state.flush(&document, &CancellationToken::new());
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn oversized_disposes_and_notifies() {
        let mut config = TrackerConfig::default();
        config.limits.max_window_lines = 2;
        let document = Document::new("1\n2\n3\n4");
        let mut state = TrackerState::new(config);
        state.set_baseline("a\nb\nc\nd", &document, &CancellationToken::new());
        assert_eq!(state.status(), TrackerStatus::Suppressed(SuppressReason::Oversized));
        assert_eq!(state.take_events(), vec![HostEvent::TooBig(true)]);

        // Still too big after the edit: retried quietly.
        edit(&mut state, &document, 0, 1, "a");
        assert!(state.needs_reinstall);
        state.flush(&document, &CancellationToken::new());
        assert_eq!(state.status(), TrackerStatus::Suppressed(SuppressReason::Oversized));
        assert!(state.take_events().is_empty());
        assert!(!state.needs_reinstall);

        // Close enough to the baseline again.
        edit(&mut state, &document, 2, 3, "b\nc");
        state.flush(&document, &CancellationToken::new());
        assert_eq!(state.status(), TrackerStatus::Initialized);
        assert_eq!(spans(&state), vec![(3, 4, 3, 4)]);
        assert_eq!(
            state.take_events(),
            vec![HostEvent::TooBig(false), HostEvent::Installed(state.ranges.clone())]
        );
    }

    #[test]
    fn check_ranges_rejects_overlap() {
        let ranges = vec![Range::new(0, 2, 0, 2), Range::new(1, 3, 2, 3)];
        assert!(check_ranges(&ranges, 5, 5).is_err());
        assert!(check_ranges(&ranges[..1], 5, 5).is_ok());
        assert!(check_ranges(&ranges[..1], 1, 5).is_err());
    }
}
