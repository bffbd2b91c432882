use serde::{Deserialize, Serialize};

use lst_types::{Range, RangeId, RangeKind};

use crate::layout::VisualLayout;

/// Visible rows `[start_row, end_row)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub start_row: usize,
    pub end_row: usize,
}

impl Viewport {
    pub fn new(start_row: usize, end_row: usize) -> Self {
        Self { start_row, end_row }
    }

    /// A viewport that shows every row.
    pub fn everything() -> Self {
        Self::new(0, usize::MAX)
    }

    /// A zero-height marker is visible on either edge.
    fn shows(&self, y1: usize, y2: usize) -> bool {
        if y1 == y2 {
            self.start_row <= y1 && y1 <= self.end_row
        } else {
            y2 > self.start_row && y1 < self.end_row
        }
    }
}

/// Visual rows `[y1, y2)` of one kind. `y1 == y2` is a marker between rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangedLines {
    pub y1: usize,
    pub y2: usize,
    pub kind: RangeKind,
    /// The lines differ from the baseline in whitespace only.
    pub whitespace_only: bool,
}

impl ChangedLines {
    pub fn is_marker(&self) -> bool {
        self.y1 == self.y2
    }
}

/// Touching or overlapping changes painted as one unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesBlock {
    pub lines: Vec<ChangedLines>,
    /// Ranges that contributed, in line order.
    pub ranges: Vec<RangeId>,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    y1: usize,
    y2: usize,
    kind: RangeKind,
    whitespace_only: bool,
    range: RangeId,
}

/// Projects ranges through a [`VisualLayout`].
#[derive(Clone, Copy, Debug)]
pub struct VisibleRangeProjector<'a, L: VisualLayout + ?Sized> {
    layout: &'a L,
}

impl<'a, L: VisualLayout + ?Sized> VisibleRangeProjector<'a, L> {
    pub fn new(layout: &'a L) -> Self {
        Self { layout }
    }

    /// Blocks for the ranges visible in `viewport`, top to bottom.
    pub fn project(&self, ranges: &[Range], viewport: Viewport) -> Vec<ChangesBlock> {
        let mut entries: Vec<Entry> = ranges
            .iter()
            .flat_map(|range| self.entries(range))
            .filter(|entry| viewport.shows(entry.y1, entry.y2))
            .collect();
        entries.sort_by_key(|entry| (entry.y1, entry.y2));

        let mut blocks = Vec::new();
        let mut group: Vec<Entry> = Vec::new();
        let mut bottom = 0;
        for entry in entries {
            if !group.is_empty() && bottom < entry.y1 {
                blocks.push(build_block(std::mem::take(&mut group)));
            }
            bottom = if group.is_empty() { entry.y2 } else { bottom.max(entry.y2) };
            group.push(entry);
        }
        if !group.is_empty() {
            blocks.push(build_block(group));
        }

        tracing::trace!(
            ranges = ranges.len(),
            blocks = blocks.len(),
            start_row = viewport.start_row,
            end_row = viewport.end_row,
            "projected ranges"
        );
        blocks
    }

    fn entries(&self, range: &Range) -> Vec<Entry> {
        let entry = |line1: usize, line2: usize, kind: RangeKind, whitespace_only: bool| Entry {
            y1: self.layout.visual_row(line1),
            y2: self.layout.visual_row(line2),
            kind,
            whitespace_only,
            range: range.id,
        };

        if range.is_whitespace_only() {
            return vec![entry(range.line1, range.line2, RangeKind::Modified, true)];
        }
        match &range.inner {
            Some(inner) if !inner.is_empty() => inner
                .iter()
                .filter(|i| i.kind != RangeKind::Equal)
                .map(|i| entry(range.line1 + i.line1, range.line1 + i.line2, i.kind, false))
                .collect(),
            _ => vec![entry(range.line1, range.line2, range.kind, false)],
        }
    }
}

/// Merge one group of touching entries.
///
/// A marker touching a real span is absorbed by it, turning the span
/// `Modified` if their kinds differ. Markers left over at the same row merge
/// the same way. Real spans are cut at every boundary; a cut covered by more
/// than one kind becomes `Modified`, and neighbouring cuts of equal kind are
/// joined again.
fn build_block(entries: Vec<Entry>) -> ChangesBlock {
    let mut ranges: Vec<RangeId> = Vec::new();
    for entry in &entries {
        if !ranges.contains(&entry.range) {
            ranges.push(entry.range);
        }
    }

    let (mut spans, markers): (Vec<Entry>, Vec<Entry>) = entries.into_iter().partition(|e| e.y1 < e.y2);
    let mut loose: Vec<Entry> = Vec::new();
    for marker in markers {
        let mut absorbed = false;
        for span in spans.iter_mut().filter(|s| s.y1 <= marker.y1 && marker.y1 <= s.y2) {
            absorbed = true;
            if span.kind != marker.kind {
                span.kind = RangeKind::Modified;
                span.whitespace_only = false;
            }
        }
        if absorbed {
            continue;
        }
        match loose.iter_mut().find(|m| m.y1 == marker.y1) {
            Some(existing) if existing.kind != marker.kind => {
                existing.kind = RangeKind::Modified;
                existing.whitespace_only = false;
            }
            Some(existing) => existing.whitespace_only &= marker.whitespace_only,
            None => loose.push(marker),
        }
    }

    let mut lines: Vec<ChangedLines> = loose
        .iter()
        .map(|m| ChangedLines {
            y1: m.y1,
            y2: m.y1,
            kind: m.kind,
            whitespace_only: m.whitespace_only,
        })
        .collect();
    lines.extend(cut_spans(&spans));
    lines.sort_by_key(|l| (l.y1, l.y2));
    ChangesBlock { lines, ranges }
}

fn cut_spans(spans: &[Entry]) -> Vec<ChangedLines> {
    let mut bounds: Vec<usize> = spans.iter().flat_map(|s| [s.y1, s.y2]).collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut out: Vec<ChangedLines> = Vec::new();
    for cut in bounds.windows(2) {
        let (y1, y2) = (cut[0], cut[1]);
        let mut kind = None;
        let mut whitespace_only = true;
        for span in spans.iter().filter(|s| s.y1 <= y1 && y2 <= s.y2) {
            kind = Some(match kind {
                Some(k) if k != span.kind => RangeKind::Modified,
                _ => span.kind,
            });
            whitespace_only &= span.whitespace_only;
        }
        let Some(kind) = kind else {
            continue;
        };
        match out.last_mut() {
            Some(last) if last.y2 == y1 && last.kind == kind && last.whitespace_only == whitespace_only => {
                last.y2 = y2;
            }
            _ => out.push(ChangedLines {
                y1,
                y2,
                kind,
                whitespace_only,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Fold, FoldingLayout, PlainLayout};
    use lst_types::InnerRange;
    use proptest::prelude::*;

    fn range(id: u64, line1: usize, line2: usize, vcs_line1: usize, vcs_line2: usize) -> Range {
        Range::new(line1, line2, vcs_line1, vcs_line2).with_id(RangeId(id))
    }

    fn lines(y1: usize, y2: usize, kind: RangeKind) -> ChangedLines {
        ChangedLines {
            y1,
            y2,
            kind,
            whitespace_only: false,
        }
    }

    fn project(ranges: &[Range]) -> Vec<ChangesBlock> {
        VisibleRangeProjector::new(&PlainLayout).project(ranges, Viewport::everything())
    }

    // -----------------------------------------------------------------------
    // Single ranges
    // -----------------------------------------------------------------------

    #[test]
    fn one_block_per_separated_range() {
        let blocks = project(&[range(1, 1, 2, 1, 2), range(2, 4, 4, 3, 5), range(3, 7, 9, 5, 5)]);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].lines, vec![lines(1, 2, RangeKind::Modified)]);
        assert_eq!(blocks[1].lines, vec![lines(4, 4, RangeKind::Deleted)]);
        assert_eq!(blocks[2].lines, vec![lines(7, 9, RangeKind::Inserted)]);
        assert_eq!(blocks[2].ranges, vec![RangeId(3)]);
    }

    #[test]
    fn inner_ranges_split_a_modified_range() {
        let r = range(1, 2, 6, 2, 5).with_inner(vec![
            InnerRange::new(0, 1, 0, 1, RangeKind::Modified),
            InnerRange::new(1, 3, 1, 3, RangeKind::Equal),
            InnerRange::new(3, 4, 3, 3, RangeKind::Inserted),
        ]);
        let blocks = project(&[r]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec![lines(2, 3, RangeKind::Modified)]);
        assert_eq!(blocks[1].lines, vec![lines(5, 6, RangeKind::Inserted)]);
        assert_eq!(blocks[1].ranges, vec![RangeId(1)]);
    }

    #[test]
    fn all_equal_inner_ranges_are_whitespace_only() {
        let r = range(1, 3, 5, 3, 5).with_inner(vec![InnerRange::new(0, 2, 0, 2, RangeKind::Equal)]);
        let blocks = project(&[r]);
        assert_eq!(
            blocks[0].lines,
            vec![ChangedLines {
                y1: 3,
                y2: 5,
                kind: RangeKind::Modified,
                whitespace_only: true
            }]
        );
    }

    // -----------------------------------------------------------------------
    // Merging
    // -----------------------------------------------------------------------

    #[test]
    fn touching_spans_share_a_block_but_keep_kinds() {
        let blocks = project(&[range(1, 0, 2, 0, 0), range(2, 2, 3, 0, 1)]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].lines,
            vec![lines(0, 2, RangeKind::Inserted), lines(2, 3, RangeKind::Modified)]
        );
        assert_eq!(blocks[0].ranges, vec![RangeId(1), RangeId(2)]);
    }

    #[test]
    fn touching_spans_of_one_kind_merge() {
        let blocks = project(&[range(1, 0, 2, 0, 0), range(2, 2, 3, 2, 2)]);
        assert_eq!(blocks[0].lines, vec![lines(0, 3, RangeKind::Inserted)]);
    }

    #[test]
    fn marker_on_a_span_of_another_kind_becomes_modified() {
        let blocks = project(&[range(1, 2, 4, 2, 2), range(2, 4, 4, 2, 3)]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, vec![lines(2, 4, RangeKind::Modified)]);
        assert_eq!(blocks[0].ranges, vec![RangeId(1), RangeId(2)]);
    }

    #[test]
    fn coinciding_markers_of_different_kinds() {
        // With 1..4 folded, the inserted range 2..3 collapses onto row 2.
        let layout = FoldingLayout::new([Fold::new(1, 4)]);
        let ranges = [range(1, 2, 3, 2, 2), range(2, 4, 4, 3, 4)];
        let blocks = VisibleRangeProjector::new(&layout).project(&ranges, Viewport::everything());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, vec![lines(2, 2, RangeKind::Modified)]);
    }

    #[test]
    fn overlapping_spans_of_different_kinds() {
        let ranges = [range(1, 0, 4, 0, 0), range(2, 2, 6, 0, 4)];
        let blocks = project(&ranges);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].lines,
            vec![lines(0, 2, RangeKind::Inserted), lines(2, 6, RangeKind::Modified)]
        );
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------

    #[test]
    fn viewport_filters_ranges() {
        let ranges = [range(1, 0, 2, 0, 2), range(2, 5, 5, 5, 6), range(3, 9, 12, 9, 9)];
        let projector = VisibleRangeProjector::new(&PlainLayout);

        let blocks = projector.project(&ranges, Viewport::new(2, 5));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].ranges, vec![RangeId(2)]);

        let blocks = projector.project(&ranges, Viewport::new(1, 10));
        let ids: Vec<RangeId> = blocks.iter().flat_map(|b| b.ranges.clone()).collect();
        assert_eq!(ids, vec![RangeId(1), RangeId(2), RangeId(3)]);

        assert!(projector.project(&ranges, Viewport::new(6, 9)).is_empty());
    }

    #[test]
    fn blocks_serialize() {
        let blocks = project(&[range(1, 1, 2, 1, 2)]);
        let json = serde_json::to_string(&blocks).unwrap();
        assert!(json.contains("\"kind\":\"modified\""));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn sorted_ranges() -> impl Strategy<Value = Vec<Range>> {
        prop::collection::vec((1usize..4, 0usize..3, 0usize..3), 0..10).prop_map(|gaps| {
            let (mut line, mut vcs) = (0, 0);
            let mut ranges = Vec::new();
            for (i, (gap, current_len, baseline_len)) in gaps.into_iter().enumerate() {
                line += gap;
                vcs += gap;
                let baseline_len = if current_len == 0 && baseline_len == 0 { 1 } else { baseline_len };
                ranges.push(range(i as u64 + 1, line, line + current_len, vcs, vcs + baseline_len));
                line += current_len;
                vcs += baseline_len;
            }
            ranges
        })
    }

    proptest! {
        #[test]
        fn projection_is_deterministic_and_ordered(ranges in sorted_ranges(), start in 0usize..20, rows in 0usize..20) {
            let layout = FoldingLayout::new([Fold::new(3, 7)]);
            let projector = VisibleRangeProjector::new(&layout);
            let viewport = Viewport::new(start, start + rows);
            let blocks = projector.project(&ranges, viewport);
            prop_assert_eq!(&blocks, &projector.project(&ranges, viewport));

            for block in &blocks {
                prop_assert!(!block.lines.is_empty());
                for pair in block.lines.windows(2) {
                    prop_assert!(pair[0].y2 <= pair[1].y1);
                }
            }
            for pair in blocks.windows(2) {
                let last = pair[0].lines.iter().map(|l| l.y2).max().unwrap_or(0);
                let first = pair[1].lines.iter().map(|l| l.y1).min().unwrap_or(0);
                prop_assert!(last < first);
            }
        }
    }
}
