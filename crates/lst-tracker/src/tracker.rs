use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

use tracing::warn;

use lst_diff::CancellationToken;
use lst_text::{Document, EditEvent, EditListener, ListenerId};
use lst_types::{Range, TransferDirection};

use crate::config::TrackerConfig;
use crate::error::TrackerResult;
use crate::host::{HostEvent, NoopHost, TrackerHost};
use crate::query;
use crate::state::TrackerState;
use crate::status::TrackerStatus;

/// Keeps the changed-line ranges of a [`Document`] current against a
/// baseline text.
///
/// Edits only record a dirty window; the ranges are recomputed lazily, on the
/// thread that created the tracker, the next time they are read. Reads from
/// any other thread see the last consistent result, or `None` while edits are
/// pending.
///
/// ```ignore
/// let document = Document::shared("a\nX\nc");
/// let tracker = LineStatusTracker::new(Arc::clone(&document), TrackerConfig::default());
/// tracker.set_baseline("a\nb\nc");
/// assert_eq!(tracker.ranges().unwrap().len(), 1);
/// ```
pub struct LineStatusTracker {
    document: Arc<Document>,
    state: Mutex<TrackerState>,
    /// Token for the computation currently allowed to run. Kept outside
    /// `state` so it can be fired while a computation holds the state lock.
    cancel: Mutex<CancellationToken>,
    host: Arc<dyn TrackerHost>,
    owner: ThreadId,
    listener: Mutex<Option<ListenerId>>,
}

impl LineStatusTracker {
    /// Create a tracker that reports to nobody.
    pub fn new(document: Arc<Document>, config: TrackerConfig) -> Arc<Self> {
        Self::with_host(document, config, Arc::new(NoopHost))
    }

    /// Create a tracker and subscribe it to `document`. The calling thread
    /// becomes the owning thread.
    pub fn with_host(document: Arc<Document>, config: TrackerConfig, host: Arc<dyn TrackerHost>) -> Arc<Self> {
        let tracker = Arc::new(Self {
            document: Arc::clone(&document),
            state: Mutex::new(TrackerState::new(config)),
            cancel: Mutex::new(CancellationToken::new()),
            host,
            owner: thread::current().id(),
            listener: Mutex::new(None),
        });
        let weak: Weak<dyn EditListener> = Arc::downgrade(&tracker) as Weak<dyn EditListener>;
        let id = document.add_listener(weak);
        *tracker.listener_slot() = Some(id);
        tracker
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listener_slot(&self) -> MutexGuard<'_, Option<ListenerId>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token(&self) -> CancellationToken {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Cancel whatever is computing and hand out a fresh token.
    fn renew_token(&self) -> CancellationToken {
        let mut current = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Run `f` under the state lock, then deliver the host events it queued.
    fn run<R>(&self, cancel: CancellationToken, f: impl FnOnce(&mut TrackerState, &CancellationToken) -> R) -> R {
        let (result, events) = {
            let mut state = self.lock();
            let result = f(&mut state, &cancel);
            (result, state.take_events())
        };
        self.dispatch(events);
        result
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TrackerState, &CancellationToken) -> R) -> R {
        self.run(self.token(), f)
    }

    /// Answer `f` from up-to-date ranges, flushing first on the owning thread.
    fn query<R>(&self, f: impl FnOnce(&[Range]) -> R) -> Option<R> {
        let owner = self.is_owner();
        self.with_state(|state, cancel| {
            if owner {
                state.flush(&self.document, cancel);
            }
            state.valid_ranges().map(f)
        })
    }

    fn dispatch(&self, events: Vec<HostEvent>) {
        for event in &events {
            event.deliver(self.host.as_ref());
        }
    }

    // ---- Lifecycle ----

    /// Replace the baseline and recompute every range. Any computation still
    /// running against the old baseline is cancelled.
    pub fn set_baseline(&self, text: &str) {
        let cancel = self.renew_token();
        self.run(cancel, |state, cancel| state.set_baseline(text, &self.document, cancel));
    }

    /// Throw away the ranges and diff the whole document again.
    pub fn reinstall(&self) {
        let cancel = self.renew_token();
        self.run(cancel, |state, cancel| state.reinstall(&self.document, cancel));
    }

    /// Recompute pending edits now, whatever the calling thread.
    pub fn update_ranges(&self) {
        self.with_state(|state, cancel| state.flush(&self.document, cancel));
    }

    /// Stop tracking incrementally until the matching
    /// [`finish_bulk_update`](Self::finish_bulk_update). Calls nest.
    pub fn start_bulk_update(&self) {
        self.with_state(|state, _| state.start_bulk_update());
    }

    /// End a bulk update. The outermost call rebuilds every range.
    pub fn finish_bulk_update(&self) {
        self.with_state(|state, cancel| state.finish_bulk_update(&self.document, cancel));
    }

    /// Detach from the document and dispose every range. Every later call is
    /// a no-op.
    pub fn release(&self) {
        self.token().cancel();
        self.with_state(|state, _| state.release());
        if let Some(id) = self.listener_slot().take() {
            self.document.remove_listener(id);
        }
    }

    // ---- State ----

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn config(&self) -> TrackerConfig {
        self.lock().config().clone()
    }

    pub fn status(&self) -> TrackerStatus {
        self.lock().status()
    }

    /// Returns `true` once a baseline is set and until release.
    pub fn is_operational(&self) -> bool {
        self.lock().is_operational()
    }

    /// Returns `true` if range queries would be answered right now.
    pub fn is_valid(&self) -> bool {
        self.query(|_| ()).is_some()
    }

    pub fn baseline_lines(&self) -> Arc<[String]> {
        self.lock().baseline()
    }

    pub fn baseline_text(&self) -> String {
        self.baseline_lines().join("\n")
    }

    // ---- Queries ----

    /// Snapshot of the installed ranges, or `None` if the tracker cannot
    /// currently vouch for them.
    pub fn ranges(&self) -> Option<Vec<Range>> {
        self.query(<[Range]>::to_vec)
    }

    pub fn range_for_line(&self, line: usize) -> Option<Range> {
        self.query(|ranges| query::range_for_line(ranges, line).cloned()).flatten()
    }

    pub fn next_range_for_line(&self, line: usize) -> Option<Range> {
        self.query(|ranges| query::next_range_for_line(ranges, line).cloned()).flatten()
    }

    pub fn prev_range_for_line(&self, line: usize) -> Option<Range> {
        self.query(|ranges| query::prev_range_for_line(ranges, line).cloned()).flatten()
    }

    /// The range following `range`, matched by identity.
    pub fn next_range(&self, range: &Range) -> Option<Range> {
        self.query(|ranges| query::next_range(ranges, range).cloned()).flatten()
    }

    /// The range preceding `range`, matched by identity.
    pub fn prev_range(&self, range: &Range) -> Option<Range> {
        self.query(|ranges| query::prev_range(ranges, range).cloned()).flatten()
    }

    pub fn is_line_modified(&self, line: usize) -> bool {
        self.query(|ranges| query::is_line_modified(ranges, line)).unwrap_or(false)
    }

    pub fn is_range_modified(&self, line1: usize, line2: usize) -> bool {
        self.query(|ranges| query::is_range_modified(ranges, line1, line2))
            .unwrap_or(false)
    }

    /// Map a line between the current text and the baseline. Lines inside a
    /// changed range map to `None` unless `approximate` is set.
    pub fn transfer_line(&self, line: usize, direction: TransferDirection, approximate: bool) -> Option<usize> {
        self.query(|ranges| query::transfer_line(ranges, line, direction, approximate))
            .flatten()
    }

    pub fn transfer_line_to_baseline(&self, line: usize, approximate: bool) -> Option<usize> {
        self.transfer_line(line, TransferDirection::ToBaseline, approximate)
    }

    pub fn transfer_line_from_baseline(&self, line: usize, approximate: bool) -> Option<usize> {
        self.transfer_line(line, TransferDirection::FromBaseline, approximate)
    }

    // ---- Rollback ----

    /// Restore the baseline text of `range`.
    pub fn rollback_range(&self, range: &Range) -> TrackerResult<()> {
        self.rollback_ranges(std::slice::from_ref(range))
    }

    /// Restore every range selected by one of `lines`.
    pub fn rollback_lines(&self, lines: &BTreeSet<usize>) -> TrackerResult<()> {
        if lines.is_empty() {
            return Ok(());
        }
        self.rollback_selected(|ranges| query::ranges_for_lines(ranges, lines))
    }

    /// Restore the baseline text of `ranges`.
    ///
    /// Ranges are matched against the installed list by identity; stale ones
    /// are skipped. Pending edits are brought up to date first, from any
    /// thread. Fails with [`NotValid`](crate::TrackerError::NotValid) if the
    /// tracker still cannot vouch for its ranges (bulk update, oversized),
    /// leaving the document untouched.
    pub fn rollback_ranges(&self, ranges: &[Range]) -> TrackerResult<()> {
        if ranges.is_empty() {
            return Ok(());
        }
        self.rollback_selected(|_| ranges.to_vec())
    }

    /// The document is written without the state lock held, and the affected
    /// window is recomputed once all writes are done.
    fn rollback_selected(&self, select: impl FnOnce(&[Range]) -> Vec<Range>) -> TrackerResult<()> {
        let plan = self.with_state(|state, cancel| {
            state.flush(&self.document, cancel);
            state.begin_rollback(select, &self.document)
        })?;
        let Some(plan) = plan else {
            return Ok(());
        };

        let mut result: TrackerResult<()> = Ok(());
        for step in &plan.steps {
            if let Err(error) = self.document.replace_lines(step.line1, step.line2, &step.lines) {
                warn!(%error, line1 = step.line1, line2 = step.line2, "rollback write failed");
                result = Err(error.into());
                break;
            }
        }

        let written = result.is_ok();
        self.with_state(|state, cancel| state.finish_rollback(plan.window, written, &self.document, cancel));
        result
    }
}

impl EditListener for LineStatusTracker {
    fn before_edit(&self, document: &Document, event: &EditEvent) {
        self.lock().before_edit(document, event);
    }

    fn after_edit(&self, document: &Document, event: &EditEvent) {
        self.lock().after_edit(document, event);
    }
}

impl Drop for LineStatusTracker {
    fn drop(&mut self) {
        if let Some(id) = self.listener_slot().take() {
            self.document.remove_listener(id);
        }
    }
}

impl fmt::Debug for LineStatusTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineStatusTracker")
            .field("status", &self.status())
            .field("owner", &self.owner)
            .finish()
    }
}
