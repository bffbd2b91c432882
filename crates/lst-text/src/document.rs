//! Line-indexed text document.
//!
//! [`Document`] owns the text of the current buffer and a table of line start
//! offsets. Every mutation goes through [`Document::replace`], which notifies
//! registered [`EditListener`]s before and after the text changes. Listeners
//! are called without any document lock held, so they are free to query the
//! document (and see the pre-edit text in `before_edit`, the post-edit text in
//! `after_edit`).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::error::{TextError, TextResult};
use crate::listener::{EditEvent, EditListener, ListenerId};

/// Text plus the byte offset at which each line starts.
#[derive(Debug)]
struct DocumentState {
    text: String,
    /// `line_starts[0] == 0`; one entry per line.
    line_starts: Vec<usize>,
}

impl DocumentState {
    fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_of_offset(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    fn line_start(&self, line: usize) -> usize {
        self.line_starts[line]
    }

    /// Offset of the end of `line`, excluding its newline.
    fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        }
    }

    fn line(&self, line: usize) -> &str {
        &self.text[self.line_start(line)..self.line_end(line)]
    }

    fn check_line(&self, line: usize) -> TextResult<()> {
        if line >= self.line_count() {
            return Err(TextError::LineOutOfBounds {
                line,
                line_count: self.line_count(),
            });
        }
        Ok(())
    }

    fn check_span(&self, offset: usize, len: usize) -> TextResult<()> {
        let end = offset.checked_add(len).unwrap_or(usize::MAX);
        for position in [offset, end] {
            if position > self.text.len() {
                return Err(TextError::OffsetOutOfBounds {
                    offset: position,
                    len: self.text.len(),
                });
            }
            if !self.text.is_char_boundary(position) {
                return Err(TextError::NotCharBoundary(position));
            }
        }
        Ok(())
    }

    /// Splice `new_text` over `[offset, offset + old_len)` and patch the line
    /// table instead of rebuilding it.
    fn apply(&mut self, offset: usize, old_len: usize, new_text: &str) {
        let first = self.line_of_offset(offset);
        let last = self.line_of_offset(offset + old_len);
        self.text.replace_range(offset..offset + old_len, new_text);

        let delta = new_text.len() as isize - old_len as isize;
        let tail: Vec<usize> = self.line_starts[last + 1..]
            .iter()
            .map(|start| start.saturating_add_signed(delta))
            .collect();
        self.line_starts.truncate(first + 1);
        self.line_starts
            .extend(new_text.match_indices('\n').map(|(i, _)| offset + i + 1));
        self.line_starts.extend(tail);
    }
}

/// A shared, line-indexed text buffer that reports every edit to its
/// listeners.
///
/// Writers are serialised by an internal edit lock, so each listener sees
/// strictly paired `before_edit`/`after_edit` calls in edit order.
pub struct Document {
    state: RwLock<DocumentState>,
    edit_lock: Mutex<()>,
    listeners: RwLock<Vec<(ListenerId, Weak<dyn EditListener>)>>,
    next_listener: AtomicU64,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            state: RwLock::new(DocumentState::new(text)),
            edit_lock: Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Create a document already wrapped for sharing with a tracker.
    pub fn shared(text: &str) -> Arc<Self> {
        Arc::new(Self::new(text))
    }

    fn read(&self) -> RwLockReadGuard<'_, DocumentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DocumentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Queries ----

    /// Full text.
    pub fn text(&self) -> String {
        self.read().text.clone()
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.read().text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().text.is_empty()
    }

    /// Number of lines; always at least one.
    pub fn line_count(&self) -> usize {
        self.read().line_count()
    }

    /// Content of one line without its newline.
    pub fn line(&self, line: usize) -> TextResult<String> {
        let state = self.read();
        state.check_line(line)?;
        Ok(state.line(line).to_string())
    }

    /// All lines.
    pub fn lines(&self) -> Vec<String> {
        let state = self.read();
        (0..state.line_count()).map(|i| state.line(i).to_string()).collect()
    }

    /// Lines `[line1, line2)`.
    pub fn lines_in(&self, line1: usize, line2: usize) -> TextResult<Vec<String>> {
        let state = self.read();
        if line1 > line2 {
            return Err(TextError::InvalidLineSpan { line1, line2 });
        }
        if line2 > state.line_count() {
            return Err(TextError::LineOutOfBounds {
                line: line2,
                line_count: state.line_count(),
            });
        }
        Ok((line1..line2).map(|i| state.line(i).to_string()).collect())
    }

    /// Line containing the byte at `offset`. The end-of-text offset belongs to
    /// the last line.
    pub fn line_of_offset(&self, offset: usize) -> TextResult<usize> {
        let state = self.read();
        if offset > state.text.len() {
            return Err(TextError::OffsetOutOfBounds {
                offset,
                len: state.text.len(),
            });
        }
        Ok(state.line_of_offset(offset))
    }

    /// Byte offset where `line` starts.
    pub fn line_start(&self, line: usize) -> TextResult<usize> {
        let state = self.read();
        state.check_line(line)?;
        Ok(state.line_start(line))
    }

    /// Byte offset where `line` ends, excluding its newline.
    pub fn line_end(&self, line: usize) -> TextResult<usize> {
        let state = self.read();
        state.check_line(line)?;
        Ok(state.line_end(line))
    }

    // ---- Edits ----

    /// Replace `old_len` bytes at `offset` with `new_text`.
    pub fn replace(&self, offset: usize, old_len: usize, new_text: &str) -> TextResult<()> {
        let _guard = self.edit_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.replace_serialized(offset, old_len, new_text)
    }

    pub fn insert(&self, offset: usize, text: &str) -> TextResult<()> {
        self.replace(offset, 0, text)
    }

    pub fn delete(&self, offset: usize, len: usize) -> TextResult<()> {
        self.replace(offset, len, "")
    }

    /// Replace the whole text.
    pub fn set_text(&self, text: &str) -> TextResult<()> {
        let _guard = self.edit_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let len = self.len();
        self.replace_serialized(0, len, text)
    }

    /// Replace lines `[line1, line2)` with `lines`, handling the newline at
    /// either edge of the text. `line1 == line2` inserts before `line1`
    /// (`line1 == line_count()` appends); an empty `lines` deletes.
    pub fn replace_lines<S: AsRef<str>>(&self, line1: usize, line2: usize, lines: &[S]) -> TextResult<()> {
        let _guard = self.edit_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (offset, old_len, text) = {
            let state = self.read();
            let count = state.line_count();
            if line1 > line2 {
                return Err(TextError::InvalidLineSpan { line1, line2 });
            }
            if line2 > count {
                return Err(TextError::LineOutOfBounds {
                    line: line2,
                    line_count: count,
                });
            }
            let joined = lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");

            match (line1 < line2, lines.is_empty()) {
                (false, true) => return Ok(()),
                (true, false) => {
                    let start = state.line_start(line1);
                    (start, state.line_end(line2 - 1) - start, joined)
                }
                (false, false) if line1 < count => (state.line_start(line1), 0, joined + "\n"),
                (false, false) => (state.text.len(), 0, format!("\n{joined}")),
                (true, true) if line2 < count => {
                    let start = state.line_start(line1);
                    (start, state.line_start(line2) - start, String::new())
                }
                (true, true) if line1 > 0 => {
                    let start = state.line_end(line1 - 1);
                    (start, state.text.len() - start, String::new())
                }
                (true, true) => (0, state.text.len(), String::new()),
            }
        };
        self.replace_serialized(offset, old_len, &text)
    }

    /// Performs one edit; the caller holds the edit lock.
    fn replace_serialized(&self, offset: usize, old_len: usize, new_text: &str) -> TextResult<()> {
        self.read().check_span(offset, old_len)?;

        let event = EditEvent {
            offset,
            old_len,
            new_len: new_text.len(),
        };
        let listeners = self.live_listeners();

        for listener in &listeners {
            listener.before_edit(self, &event);
        }
        self.write().apply(offset, old_len, new_text);
        tracing::trace!(offset, old_len, new_len = event.new_len, "document edited");
        for listener in &listeners {
            listener.after_edit(self, &event);
        }
        Ok(())
    }

    // ---- Listeners ----

    /// Register a listener. The document only keeps a weak reference; dropped
    /// listeners are pruned on the next edit.
    pub fn add_listener(&self, listener: Weak<dyn EditListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, listener)| listener.strong_count() > 0)
            .count()
    }

    fn live_listeners(&self) -> Vec<Arc<dyn EditListener>> {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|(_, listener)| listener.strong_count() > 0);
        listeners
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.len())
            .field("line_count", &self.line_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl EditListener for Recorder {
        fn before_edit(&self, document: &Document, event: &EditEvent) {
            self.calls.lock().unwrap().push(format!(
                "before {} {} {} lines={}",
                event.offset,
                event.old_len,
                event.new_len,
                document.line_count()
            ));
        }

        fn after_edit(&self, document: &Document, event: &EditEvent) {
            self.calls.lock().unwrap().push(format!(
                "after {} {} {} lines={}",
                event.offset,
                event.old_len,
                event.new_len,
                document.line_count()
            ));
        }
    }

    #[test]
    fn line_table_of_new_document() {
        let doc = Document::new("a\nbc\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.lines(), vec!["a", "bc", ""]);
        assert_eq!(doc.line_start(1).unwrap(), 2);
        assert_eq!(doc.line_end(1).unwrap(), 4);
        assert_eq!(doc.line_of_offset(4).unwrap(), 1);
        assert_eq!(doc.line_of_offset(5).unwrap(), 2);
        assert!(doc.line_of_offset(6).is_err());
    }

    #[test]
    fn empty_document_has_one_line() {
        let doc = Document::new("");
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line(0).unwrap(), "");
        assert!(doc.is_empty());
    }

    #[test]
    fn edits_patch_line_table() {
        let doc = Document::new("one\ntwo\nthree");
        doc.insert(4, "new\n").unwrap();
        assert_eq!(doc.lines(), vec!["one", "new", "two", "three"]);
        doc.delete(0, 8).unwrap();
        assert_eq!(doc.lines(), vec!["two", "three"]);
        doc.replace(3, 1, "-").unwrap();
        assert_eq!(doc.lines(), vec!["two-three"]);
    }

    #[test]
    fn rejects_invalid_spans() {
        let doc = Document::new("héllo");
        assert_eq!(doc.delete(2, 1), Err(TextError::NotCharBoundary(2)));
        assert_eq!(
            doc.insert(99, "x"),
            Err(TextError::OffsetOutOfBounds { offset: 99, len: 6 })
        );
    }

    #[test]
    fn replace_lines_in_the_middle() {
        let doc = Document::new("a\nb\nc");
        doc.replace_lines(1, 2, &["x", "y"]).unwrap();
        assert_eq!(doc.text(), "a\nx\ny\nc");
    }

    #[test]
    fn replace_lines_inserts_and_appends() {
        let doc = Document::new("a\nc");
        doc.replace_lines(1, 1, &["b"]).unwrap();
        assert_eq!(doc.text(), "a\nb\nc");
        doc.replace_lines(3, 3, &["d"]).unwrap();
        assert_eq!(doc.text(), "a\nb\nc\nd");
    }

    #[test]
    fn replace_lines_deletes_at_edges() {
        let doc = Document::new("a\nb\nc");
        doc.replace_lines(1, 2, &[] as &[&str]).unwrap();
        assert_eq!(doc.text(), "a\nc");
        doc.replace_lines(1, 2, &[] as &[&str]).unwrap();
        assert_eq!(doc.text(), "a");
        doc.replace_lines(0, 1, &[] as &[&str]).unwrap();
        assert_eq!(doc.text(), "");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn listeners_see_text_before_and_after() {
        let doc = Document::new("a\nb");
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn EditListener> = Arc::downgrade(&recorder) as Weak<dyn EditListener>;
        let id = doc.add_listener(weak);

        doc.insert(1, "\nx").unwrap();
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec!["before 1 0 2 lines=2", "after 1 0 2 lines=3"]
        );

        assert!(doc.remove_listener(id));
        doc.insert(0, "z").unwrap();
        assert_eq!(recorder.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn dropped_listeners_are_pruned() {
        let doc = Document::new("a");
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn EditListener> = Arc::downgrade(&recorder) as Weak<dyn EditListener>;
        doc.add_listener(weak);
        assert_eq!(doc.listener_count(), 1);
        drop(recorder);
        doc.insert(0, "b").unwrap();
        assert_eq!(doc.listener_count(), 0);
    }

    proptest! {
        #[test]
        fn line_table_matches_rebuild(
            text in "[ab\n]{0,20}",
            edits in prop::collection::vec((0usize..30, 0usize..5, "[xy\n]{0,4}"), 0..8),
        ) {
            let doc = Document::new(&text);
            for (offset, len, insert) in edits {
                let total = doc.len();
                let offset = offset.min(total);
                let len = len.min(total - offset);
                doc.replace(offset, len, &insert).unwrap();
                prop_assert_eq!(doc.lines(), lst_types::split_lines(&doc.text()));
            }
        }
    }
}
