use serde::{Deserialize, Serialize};

use crate::document::Document;

/// One text replacement, in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditEvent {
    /// Where the replaced text starts.
    pub offset: usize,
    /// Length of the replaced text.
    pub old_len: usize,
    /// Length of the inserted text.
    pub new_len: usize,
}

/// Handle returned by [`Document::add_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Receives edit notifications from a [`Document`].
///
/// Calls arrive as strictly ordered `before_edit`/`after_edit` pairs on the
/// thread performing the edit. No document lock is held during a call, so
/// implementations may read the document; they must not edit it.
pub trait EditListener: Send + Sync {
    /// Called while the document still holds the pre-edit text.
    fn before_edit(&self, document: &Document, event: &EditEvent);

    /// Called once the document holds the post-edit text.
    fn after_edit(&self, document: &Document, event: &EditEvent);
}
