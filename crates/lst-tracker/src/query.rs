//! Read-only lookups over a sorted, non-overlapping range list.

use std::collections::BTreeSet;

use lst_types::{Range, TransferDirection};

pub(crate) fn range_for_line(ranges: &[Range], line: usize) -> Option<&Range> {
    ranges.iter().find(|r| r.is_selected_by_line(line))
}

/// First range starting strictly below `line`.
pub(crate) fn next_range_for_line(ranges: &[Range], line: usize) -> Option<&Range> {
    ranges.iter().find(|r| r.line1 > line)
}

/// Last range ending at or above `line` that `line` itself does not select.
pub(crate) fn prev_range_for_line(ranges: &[Range], line: usize) -> Option<&Range> {
    ranges
        .iter()
        .rev()
        .find(|r| r.line2 <= line && !r.is_selected_by_line(line))
}

pub(crate) fn next_range<'a>(ranges: &'a [Range], range: &Range) -> Option<&'a Range> {
    let index = ranges.iter().position(|r| r.id == range.id)?;
    ranges.get(index + 1)
}

pub(crate) fn prev_range<'a>(ranges: &'a [Range], range: &Range) -> Option<&'a Range> {
    let index = ranges.iter().position(|r| r.id == range.id)?;
    index.checked_sub(1).and_then(|i| ranges.get(i))
}

pub(crate) fn is_line_modified(ranges: &[Range], line: usize) -> bool {
    ranges.iter().any(|r| r.line1 <= line && line < r.line2)
}

/// Returns `true` if any range overlaps `[line1, line2)`. A zero-height range
/// counts when it sits strictly inside the span.
pub(crate) fn is_range_modified(ranges: &[Range], line1: usize, line2: usize) -> bool {
    if line1 >= line2 {
        return false;
    }
    ranges.iter().any(|r| r.line1 < line2 && r.line2 > line1)
}

/// Ranges selected by at least one of `lines`, in list order.
pub(crate) fn ranges_for_lines(ranges: &[Range], lines: &BTreeSet<usize>) -> Vec<Range> {
    ranges
        .iter()
        .filter(|r| lines.iter().any(|&line| r.is_selected_by_line(line)))
        .cloned()
        .collect()
}

/// Map `line` across the range list.
///
/// Outside every range the line moves by the accumulated size difference of
/// the ranges before it. Inside a non-empty range there is no exact
/// counterpart: `approximate` maps to the same offset in the other side,
/// clamped to its last line (or to its start when that side is empty).
pub(crate) fn transfer_line(
    ranges: &[Range],
    line: usize,
    direction: TransferDirection,
    approximate: bool,
) -> Option<usize> {
    let mut delta = 0isize;
    for range in ranges {
        let (from1, from2, to1, to2) = match direction {
            TransferDirection::ToBaseline => (range.line1, range.line2, range.vcs_line1, range.vcs_line2),
            TransferDirection::FromBaseline => (range.vcs_line1, range.vcs_line2, range.line1, range.line2),
        };
        if line < from1 {
            break;
        }
        if line < from2 {
            if !approximate {
                return None;
            }
            let within = (line - from1).min((to2 - to1).saturating_sub(1));
            return Some(to1 + within);
        }
        delta += (to2 - to1) as isize - (from2 - from1) as isize;
    }
    line.checked_add_signed(delta)
}
