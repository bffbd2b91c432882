//! Coalescing of pending edits into a single dirty window.

use lst_types::EditSpan;

/// The not-yet-recomputed window of the current text.
///
/// `[line1, line2)` is in current-text coordinates. The same window in the
/// coordinates of the installed ranges (before this batch of edits) is
/// `[line1, line2 - line_shift)`: edits only ever move lines that follow them,
/// and every edit of the batch lies inside the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRange {
    pub line1: usize,
    pub line2: usize,
    /// Net line count change over the whole batch.
    pub line_shift: isize,
    /// Document line count before the first edit of the batch.
    pub total_lines_before_batch: usize,
}

impl DirtyRange {
    /// Start a batch with its first edit.
    pub fn new(span: EditSpan, total_lines_before_batch: usize) -> Self {
        Self {
            line1: span.after_line1,
            line2: span.after_line2,
            line_shift: span.line_shift(),
            total_lines_before_batch,
        }
    }

    /// Widen the window to also cover `span`, an edit expressed in the
    /// coordinates of the text as it was right before that edit.
    ///
    /// The union of the old window and the edited lines is taken in those
    /// coordinates; its end then moves by the edit's own shift.
    pub fn merge(self, span: EditSpan) -> Self {
        let shift = span.line_shift();
        let start = self.line1.min(span.before_line1);
        let end = self.line2.max(span.before_line2);
        Self {
            line1: start,
            line2: end.saturating_add_signed(shift),
            line_shift: self.line_shift + shift,
            total_lines_before_batch: self.total_lines_before_batch,
        }
    }

    /// The window in the coordinates of the installed ranges, or `None` if
    /// the bookkeeping is inconsistent.
    pub fn original_window(&self) -> Option<(usize, usize)> {
        let end = self.line2 as isize - self.line_shift;
        if end < self.line1 as isize || end as usize > self.total_lines_before_batch {
            return None;
        }
        Some((self.line1, end as usize))
    }

    /// Line count the document must have for this window to be trusted.
    pub fn expected_line_count(&self) -> isize {
        self.total_lines_before_batch as isize + self.line_shift
    }
}
