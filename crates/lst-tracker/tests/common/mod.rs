#![allow(dead_code)] // Shared across the tracker test binaries; each uses a subset.

use std::sync::{Arc, Mutex, PoisonError};

use lst_text::Document;
use lst_tracker::{LineStatusTracker, TrackerConfig, TrackerHost};
use lst_types::{Range, RangeId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Installed(Vec<RangeId>),
    Disposed(Vec<RangeId>),
    TooBig(bool),
}

/// Host that remembers every notification.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<Event>>,
}

impl RecordingHost {
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

impl TrackerHost for RecordingHost {
    fn ranges_installed(&self, ranges: &[Range]) {
        self.push(Event::Installed(ranges.iter().map(|r| r.id).collect()));
    }

    fn ranges_disposed(&self, ranges: &[Range]) {
        self.push(Event::Disposed(ranges.iter().map(|r| r.id).collect()));
    }

    fn too_big_changed(&self, too_big: bool) {
        self.push(Event::TooBig(too_big));
    }
}

pub struct Fixture {
    pub document: Arc<Document>,
    pub tracker: Arc<LineStatusTracker>,
    pub host: Arc<RecordingHost>,
}

pub fn tracked(baseline: &str, current: &str) -> Fixture {
    tracked_with(baseline, current, TrackerConfig::default())
}

pub fn tracked_with(baseline: &str, current: &str, config: TrackerConfig) -> Fixture {
    let document = Document::shared(current);
    let host = Arc::new(RecordingHost::default());
    let tracker = LineStatusTracker::with_host(Arc::clone(&document), config, host.clone());
    tracker.set_baseline(baseline);
    Fixture {
        document,
        tracker,
        host,
    }
}

pub fn spans(ranges: &[Range]) -> Vec<(usize, usize, usize, usize)> {
    ranges
        .iter()
        .map(|r| (r.line1, r.line2, r.vcs_line1, r.vcs_line2))
        .collect()
}

pub fn ids(ranges: &[Range]) -> Vec<RangeId> {
    ranges.iter().map(|r| r.id).collect()
}

/// Rebuild the current lines by replacing each range's baseline span with
/// its current span.
pub fn reconstruct(baseline: &[String], current: &[String], ranges: &[Range]) -> Vec<String> {
    let mut out = Vec::new();
    let mut next = 0;
    for range in ranges {
        out.extend_from_slice(&baseline[next..range.vcs_line1]);
        out.extend_from_slice(&current[range.line1..range.line2]);
        next = range.vcs_line2;
    }
    out.extend_from_slice(&baseline[next..]);
    out
}

pub fn assert_sorted(ranges: &[Range]) {
    for pair in ranges.windows(2) {
        assert!(pair[0].line2 <= pair[1].line1, "{} overlaps {}", pair[0], pair[1]);
        assert!(pair[0].vcs_line2 <= pair[1].vcs_line1, "{} overlaps {}", pair[0], pair[1]);
    }
}
