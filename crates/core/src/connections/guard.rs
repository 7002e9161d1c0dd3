//! Idempotency guard for callback processing
//!
//! UI re-renders and duplicate event delivery can run callback detection more
//! than once for the same inbound navigation before the URL has been
//! rewritten. State that only becomes visible on a later turn cannot stop
//! that, so the guard is backed by atomics: the test-and-set completes
//! synchronously within the calling turn.

use std::sync::atomic::{AtomicBool, Ordering};

/// Reentrancy-safe gate around a single callback arrival.
///
/// `held` is true while a token exchange for the current arrival is in
/// flight. `processed` stays true after release until the authorization code
/// leaves the URL, so a re-render that still sees the old code cannot submit
/// it a second time.
#[derive(Debug, Default)]
pub struct CallbackGuard {
    held: AtomicBool,
    processed: AtomicBool,
}

impl CallbackGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically test and set the held flag.
    ///
    /// Returns `false` when the guard is already held or the current arrival
    /// has already been processed. There is no suspension point between the
    /// test and the set.
    pub fn try_acquire(&self) -> bool {
        if self.processed.load(Ordering::SeqCst) {
            return false;
        }
        self.held.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok()
    }

    /// Release the guard and mark the arrival as processed.
    ///
    /// Idempotent: releasing twice without an intervening acquire changes
    /// nothing.
    pub fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.processed.store(true, Ordering::SeqCst);
    }

    /// Rearm the guard once the URL no longer carries a code.
    pub fn reset(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.processed.store(false, Ordering::SeqCst);
    }

    /// Whether an exchange is currently in flight.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// Whether the current arrival has already been processed.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.processed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_succeeds_once() {
        let guard = CallbackGuard::new();
        assert!(guard.try_acquire());
        assert!(!guard.try_acquire());
        assert!(guard.is_held());
    }

    #[test]
    fn release_is_idempotent() {
        let guard = CallbackGuard::new();
        assert!(guard.try_acquire());
        guard.release();
        let held = guard.is_held();
        let processed = guard.is_processed();
        guard.release();
        assert_eq!(guard.is_held(), held);
        assert_eq!(guard.is_processed(), processed);
    }

    #[test]
    fn processed_arrival_blocks_reacquisition_until_reset() {
        let guard = CallbackGuard::new();
        assert!(guard.try_acquire());
        guard.release();
        // Same code still visible in the URL: detection must become a no-op.
        assert!(!guard.try_acquire());
        guard.reset();
        assert!(guard.try_acquire());
    }

    #[test]
    fn concurrent_acquisition_admits_exactly_one() {
        use std::sync::Arc;

        let guard = Arc::new(CallbackGuard::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                std::thread::spawn(move || guard.try_acquire())
            })
            .collect();
        let acquired = handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(false))
            .filter(|acquired| *acquired)
            .count();
        assert_eq!(acquired, 1);
    }
}
