//! Callbacks from the tracker to its embedder.

use lst_types::Range;

/// Receives range lifecycle notifications.
///
/// Calls are made after the tracker has released its internal lock, so a
/// host may query the tracker from inside a callback. Every method has a
/// no-op default.
pub trait TrackerHost: Send + Sync {
    /// Ranges that just became part of the installed list.
    fn ranges_installed(&self, _ranges: &[Range]) {}

    /// Ranges that were removed from the installed list.
    fn ranges_disposed(&self, _ranges: &[Range]) {}

    /// The tracker entered (`true`) or left (`false`) the oversized state.
    fn too_big_changed(&self, _too_big: bool) {}
}

/// A host that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHost;

impl TrackerHost for NoopHost {}

/// Notification queued under the lock and delivered after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum HostEvent {
    Installed(Vec<Range>),
    Disposed(Vec<Range>),
    TooBig(bool),
}

impl HostEvent {
    pub(crate) fn deliver(&self, host: &dyn TrackerHost) {
        match self {
            Self::Installed(ranges) => host.ranges_installed(ranges),
            Self::Disposed(ranges) => host.ranges_disposed(ranges),
            Self::TooBig(too_big) => host.too_big_changed(*too_big),
        }
    }
}
