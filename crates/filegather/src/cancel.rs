//! Cancellation tokens for search operations.
//!
//! A token wraps a shared flag. The host keeps one clone and calls
//! [`CancellationToken::cancel`]; the search worker polls its clone at every
//! root, directory, and file boundary. Cancellation is cooperative: a stat or
//! content read already in flight finishes before the flag is observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation token for terminating a running search early.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that nothing else holds, so it is never cancelled.
    ///
    /// Useful for tests or synchronous callers that never interrupt.
    #[inline]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if this token is still active.
    ///
    /// Returns `Some(())` if still active, `None` if cancelled.
    /// This enables use with the `?` operator for early returns.
    #[inline]
    pub fn is_cancelled(&self) -> Option<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            None
        } else {
            Some(())
        }
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    #[inline]
    pub fn was_cancelled(&self) -> bool {
        self.is_cancelled().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_token_is_never_cancelled() {
        let token = CancellationToken::noop();
        assert!(token.is_cancelled().is_some());
        assert!(!token.was_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let worker = token.clone();
        assert!(worker.is_cancelled().is_some());

        token.cancel();
        assert!(worker.is_cancelled().is_none());
        assert!(worker.was_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.was_cancelled());
    }
}
