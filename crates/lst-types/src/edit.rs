use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The line window touched by a single edit, before and after it applied.
///
/// `[before_line1, before_line2)` are the lines the edit replaced, in the
/// coordinates of the text before the edit; `[after_line1, after_line2)` are
/// the lines that replaced them. An edit never moves its own start, so
/// `before_line1 == after_line1` for spans built from document events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditSpan {
    pub before_line1: usize,
    pub before_line2: usize,
    pub after_line1: usize,
    pub after_line2: usize,
}

impl EditSpan {
    pub fn new(
        before_line1: usize,
        before_line2: usize,
        after_line1: usize,
        after_line2: usize,
    ) -> Result<Self, TypeError> {
        if before_line1 > before_line2 || after_line1 > after_line2 {
            return Err(TypeError::InvalidEditSpan(format!(
                "[{before_line1}, {before_line2}) -> [{after_line1}, {after_line2})"
            )));
        }
        if before_line1 != after_line1 {
            return Err(TypeError::InvalidEditSpan(format!(
                "edit start moved from {before_line1} to {after_line1}"
            )));
        }
        Ok(Self {
            before_line1,
            before_line2,
            after_line1,
            after_line2,
        })
    }

    /// Lines replaced by the edit.
    pub fn before_len(&self) -> usize {
        self.before_line2 - self.before_line1
    }

    /// Lines that replaced them.
    pub fn after_len(&self) -> usize {
        self.after_line2 - self.after_line1
    }

    /// Net change in the document's line count caused by the edit.
    pub fn line_shift(&self) -> isize {
        self.after_len() as isize - self.before_len() as isize
    }
}
