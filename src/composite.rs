//! Grouped acquisition of multiple named semaphores.
//!
//! A [`CompositeLock`] acquires its members one at a time in a single global
//! order shared by every composite in the process: ascending capacity, with
//! the lock name as tie-break. Two concurrent requests over overlapping lock
//! sets therefore contend on their shared members in the same sequence and
//! can never form a cyclic wait. The ordering key is a system-wide invariant,
//! not an implementation detail; both halves are immutable for the lifetime
//! of a semaphore, so the order between any two locks never changes.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::semaphore::NamedSemaphore;
use std::cmp::Ordering;
use std::sync::Arc;

/// An ordered group of semaphores acquired and released as one unit.
///
/// Ephemeral: built per request and discarded after release. Requests may
/// name the same lock twice; duplicates are kept and acquired twice.
#[derive(Debug)]
pub struct CompositeLock {
    locks: Vec<Arc<NamedSemaphore>>,
}

/// The global acquisition order: ascending capacity, then name.
fn acquisition_order(a: &NamedSemaphore, b: &NamedSemaphore) -> Ordering {
    a.capacity()
        .cmp(&b.capacity())
        .then_with(|| a.name().cmp(b.name()))
}

impl CompositeLock {
    /// Sort the resolved semaphores into the global acquisition order.
    pub fn new(mut locks: Vec<Arc<NamedSemaphore>>) -> Self {
        locks.sort_by(|a, b| acquisition_order(a, b));
        Self { locks }
    }

    /// Number of member locks, counting duplicates.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Member lock names in acquisition order.
    pub fn names(&self) -> Vec<&str> {
        self.locks.iter().map(|lock| lock.name()).collect()
    }

    /// Acquire every member in ascending order, blocking as needed.
    ///
    /// If cancelled partway through, members already held are released in
    /// reverse order before the failure propagates; a failed acquire never
    /// leaves capacity held.
    pub fn acquire(&self, cancel: &CancelToken) -> Result<()> {
        for (held, lock) in self.locks.iter().enumerate() {
            if let Err(err) = lock.acquire(cancel) {
                for acquired in self.locks[..held].iter().rev() {
                    acquired.release();
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Release every member in the exact reverse of acquisition order.
    pub fn release(&self) {
        for lock in self.locks.iter().rev() {
            lock.release();
        }
    }
}

/// The lock resolved for one request: a lone semaphore or a composite group.
///
/// A request naming exactly one lock uses the semaphore directly; the
/// observable behavior is identical to a one-member composite.
#[derive(Debug)]
pub enum JobLock {
    /// Exactly one name resolved.
    Single(Arc<NamedSemaphore>),
    /// Zero or several names resolved.
    Composite(CompositeLock),
}

impl JobLock {
    /// Block until every resolved lock is held.
    pub fn acquire(&self, cancel: &CancelToken) -> Result<()> {
        match self {
            JobLock::Single(lock) => lock.acquire(cancel),
            JobLock::Composite(composite) => composite.acquire(cancel),
        }
    }

    /// Release every held lock. Never fails.
    pub fn release(&self) {
        match self {
            JobLock::Single(lock) => lock.release(),
            JobLock::Composite(composite) => composite.release(),
        }
    }

    /// Resolved lock names, in acquisition order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            JobLock::Single(lock) => vec![lock.name()],
            JobLock::Composite(composite) => composite.names(),
        }
    }
}
