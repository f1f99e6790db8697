//! First-error-wins storage, shared by every worker in a [`super::Pool`].
//!
//! Go's reference implementation uses a `sync.Once` guarding a plain `error`
//! field, which only ever needs to be read once (by the one goroutine
//! calling `Wait`). This crate's [`super::Pool::wait`] takes `self` by
//! value so in practice it is also only ever read once, but nothing in the
//! public API rules out a caller stashing a clone of the pool's error
//! separately and inspecting it again later, so the latch is built to
//! tolerate repeated reads rather than a single `take`: the captured error
//! lives behind a `Mutex<Option<E>>` and is cloned out rather than moved
//! out, which is why `E: Clone` is required here (the same trade-off
//! `tokio::sync::broadcast` makes for its channel item type).

// Layer 1: Standard library
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party
use parking_lot::Mutex;

pub(crate) struct ErrorLatch<E> {
    captured: AtomicBool,
    slot: Mutex<Option<E>>,
}

impl<E: Clone> ErrorLatch<E> {
    pub(crate) fn new() -> Self {
        Self {
            captured: AtomicBool::new(false),
            slot: Mutex::new(None),
        }
    }

    /// Store `err` if and only if no error has been captured yet. Later
    /// calls after the first are no-ops, preserving first-error-wins order
    /// even under concurrent task failures.
    pub(crate) fn capture(&self, err: E) {
        if !self.captured.swap(true, Ordering::SeqCst) {
            *self.slot.lock() = Some(err);
        }
    }

    pub(crate) fn get(&self) -> Option<E> {
        self.slot.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_capture_wins() {
        let latch = ErrorLatch::new();
        latch.capture("first");
        latch.capture("second");
        assert_eq!(latch.get(), Some("first"));
    }

    #[test]
    fn empty_latch_reports_none() {
        let latch: ErrorLatch<&str> = ErrorLatch::new();
        assert_eq!(latch.get(), None);
    }

    #[test]
    fn get_is_repeatable() {
        let latch = ErrorLatch::new();
        latch.capture("oops");
        assert_eq!(latch.get(), Some("oops"));
        assert_eq!(latch.get(), Some("oops"));
    }
}
