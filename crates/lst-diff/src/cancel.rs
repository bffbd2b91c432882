use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{DiffError, DiffResult};

/// Cooperative cancellation signal threaded through a diff computation.
///
/// Clones share the same flag. Once cancelled a token stays cancelled; callers
/// that want to retry later create a fresh one.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with [`DiffError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> DiffResult<()> {
        if self.is_cancelled() {
            Err(DiffError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(clone.check().is_ok());
        token.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.check(), Err(DiffError::Cancelled));
    }
}
