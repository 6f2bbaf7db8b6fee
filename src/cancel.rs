//! Cancellation tokens for concurrent subtree searches.
//!
//! Each search call owns one token. Tasks check the token at entry and return
//! without visiting their node once it is cancelled. The token is only
//! cancelled when the outer call returns (via [`CancelOnDrop`]), never on a
//! match, so branches already in flight still visit their whole subtree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation token shared by all tasks of one search call.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the active (not cancelled) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Tasks that have not yet started observe this at entry and return
    /// immediately; tasks already past their entry check run to completion.
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

    /// Arms a guard that cancels this token when dropped.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop {
            token: self.clone(),
        }
    }
}

/// Guard that cancels its token when dropped.
///
/// Held for the duration of a search call so that any task scheduled after
/// the call has returned sees a cancelled token and never starts.
#[derive(Debug)]
pub struct CancelOnDrop {
    token: CancellationToken,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
