//! Typing into a large tracked document.
//!
//! Compares the incremental update after a single keystroke with a full
//! rebuild of the same document.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lst_text::Document;
use lst_tracker::{LineStatusTracker, TrackerConfig};

fn source(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("    let value_{i} = compute({i});"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn tracked(lines: usize) -> (Arc<Document>, Arc<LineStatusTracker>) {
    let baseline = source(lines);
    let document = Document::shared(&baseline);
    let tracker = LineStatusTracker::new(Arc::clone(&document), TrackerConfig::default());
    tracker.set_baseline(&baseline);
    (document, tracker)
}

fn bench_keystroke(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystroke");
    for lines in [1_000usize, 10_000, 50_000] {
        let (document, tracker) = tracked(lines);
        let offset = document.line_start(lines / 2).unwrap_or(0);
        group.bench_with_input(BenchmarkId::new("incremental", lines), &lines, |b, _| {
            b.iter(|| {
                document.insert(offset, "x").unwrap();
                black_box(tracker.ranges());
                document.delete(offset, 1).unwrap();
                black_box(tracker.ranges());
            })
        });
        group.bench_with_input(BenchmarkId::new("reinstall", lines), &lines, |b, _| {
            b.iter(|| {
                tracker.reinstall();
                black_box(tracker.ranges());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_keystroke);
criterion_main!(benches);
