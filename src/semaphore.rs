//! Counting semaphore bound to a lock name.
//!
//! A [`NamedSemaphore`] owns a name and a fixed positive capacity, the maximum
//! number of concurrent holders. `acquire` blocks the calling thread until a
//! slot is free or the supplied [`CancelToken`] fires; `release` returns a
//! slot and wakes at most one blocked waiter. Instances are shared between
//! worker threads behind `Arc` and never destroyed while the registry that
//! created them is alive.

use crate::cancel::CancelToken;
use crate::error::{NamelockError, Result};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// How often a blocked waiter re-checks its cancel token.
///
/// Releases wake waiters immediately through the condvar; this interval only
/// bounds the latency of observing a cancellation.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A named resource with a bounded number of concurrent holders.
#[derive(Debug)]
pub struct NamedSemaphore {
    name: String,
    capacity: usize,
    available: Mutex<usize>,
    slot_freed: Condvar,
}

impl NamedSemaphore {
    /// Create a semaphore with `capacity` free slots.
    ///
    /// Capacity must be at least 1; the registry rejects smaller values at
    /// configuration parse time.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        debug_assert!(capacity >= 1, "semaphore capacity must be positive");
        Self {
            name: name.into(),
            capacity,
            available: Mutex::new(capacity),
            slot_freed: Condvar::new(),
        }
    }

    /// The lock name this semaphore was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fixed maximum number of concurrent holders.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of currently free slots.
    pub fn available(&self) -> usize {
        *self
            .available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Take one slot, blocking until one is free.
    ///
    /// Fails with [`NamelockError::Interrupted`] if `cancel` fires while
    /// waiting; no slot is consumed on a failed attempt.
    pub fn acquire(&self, cancel: &CancelToken) -> Result<()> {
        let mut available = self
            .available
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        loop {
            if cancel.is_cancelled() {
                return Err(NamelockError::Interrupted(self.name.clone()));
            }
            if *available > 0 {
                *available -= 1;
                return Ok(());
            }
            let (guard, _timed_out) = self
                .slot_freed
                .wait_timeout(available, CANCEL_POLL_INTERVAL)
                .unwrap_or_else(PoisonError::into_inner);
            available = guard;
        }
    }

    /// Return one slot and wake at most one blocked waiter.
    ///
    /// Must only be called by a holder whose `acquire` completed successfully;
    /// an unmatched release is a caller error. Never blocks, never fails.
    pub fn release(&self) {
        let mut available = self
            .available
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        debug_assert!(
            *available < self.capacity,
            "release without a matching acquire on '{}'",
            self.name
        );
        *available += 1;
        drop(available);
        self.slot_freed.notify_one();
    }
}
