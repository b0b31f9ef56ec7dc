//! Per-job lock session.
//!
//! A [`LockSession`] ties one job's lifecycle together: resolve the request
//! text, block until every named lock is held, then guarantee release on
//! every exit path. Dropping the session releases the locks, so a panicking
//! or early-returning job cannot leak capacity; [`LockSession::release`]
//! ends the session explicitly.
//!
//! The session holds the lock instances resolved at begin time and releases
//! exactly those, so later configuration or registry changes cannot redirect
//! the teardown.

use crate::cancel::CancelToken;
use crate::composite::JobLock;
use crate::error::Result;
use crate::events::{Event, EventAction, EventLog};
use crate::registry::LockRegistry;

/// A held set of named locks, released on drop.
#[derive(Debug)]
pub struct LockSession {
    lock: JobLock,
    request: String,
    job: Option<String>,
    events: Option<EventLog>,
    released: bool,
}

impl LockSession {
    /// Resolve `request` against the registry and block until held.
    ///
    /// Fails with a configuration error if the registry's text is malformed,
    /// or with `Interrupted` if `cancel` fires while waiting; a failed begin
    /// holds nothing.
    pub fn begin(
        registry: &LockRegistry,
        request: &str,
        cancel: &CancelToken,
        events: Option<EventLog>,
    ) -> Result<Self> {
        Self::begin_session(registry, request, None, cancel, events)
    }

    /// Like [`LockSession::begin`], tagging emitted events with a job name.
    pub fn begin_for_job(
        registry: &LockRegistry,
        request: &str,
        job: &str,
        cancel: &CancelToken,
        events: Option<EventLog>,
    ) -> Result<Self> {
        Self::begin_session(registry, request, Some(job.to_string()), cancel, events)
    }

    fn begin_session(
        registry: &LockRegistry,
        request: &str,
        job: Option<String>,
        cancel: &CancelToken,
        events: Option<EventLog>,
    ) -> Result<Self> {
        emit(&events, &job, EventAction::Resolve, request);
        let lock = registry.take(request)?;

        emit(&events, &job, EventAction::Acquire, request);
        lock.acquire(cancel)?;
        emit(&events, &job, EventAction::Acquired, request);

        Ok(Self {
            lock,
            request: request.to_string(),
            job,
            events,
            released: false,
        })
    }

    /// The raw request text this session was begun with.
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Names of the held locks, in acquisition order.
    pub fn lock_names(&self) -> Vec<&str> {
        self.lock.names()
    }

    /// End the session, returning every held lock. Never fails.
    ///
    /// Dropping the session has the same effect; this form just makes the
    /// release point explicit in the caller.
    pub fn release(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        emit(&self.events, &self.job, EventAction::Release, &self.request);
        self.lock.release();
        emit(&self.events, &self.job, EventAction::Released, &self.request);
    }
}

impl Drop for LockSession {
    fn drop(&mut self) {
        self.release_now();
    }
}

/// Run `work` while holding the locks named in `request`.
///
/// The locks are released before returning, including when `work` panics
/// (via the session's drop guard during unwind).
pub fn with_locks<T>(
    registry: &LockRegistry,
    request: &str,
    cancel: &CancelToken,
    work: impl FnOnce() -> T,
) -> Result<T> {
    let session = LockSession::begin(registry, request, cancel, None)?;
    let value = work();
    session.release();
    Ok(value)
}

/// Append an event, degrading to a stderr warning on failure.
///
/// Event logging is observability only; a full disk must not wedge a
/// release path.
fn emit(events: &Option<EventLog>, job: &Option<String>, action: EventAction, request: &str) {
    let Some(log) = events else {
        return;
    };
    let mut event = Event::new(action, request);
    if let Some(job) = job {
        event = event.with_job(job.clone());
    }
    if let Err(e) = log.append(&event) {
        eprintln!("Warning: failed to record {} event: {}", action, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NamelockError;
    use tempfile::TempDir;

    #[test]
    fn begin_holds_and_release_frees_the_requested_locks() {
        let registry = LockRegistry::new("db=2 ui=1");
        let cancel = CancelToken::new();
        let locks = registry.resolve("db ui").unwrap();

        let session = LockSession::begin(&registry, "db ui", &cancel, None).unwrap();
        assert_eq!(locks[0].available(), 1);
        assert_eq!(locks[1].available(), 0);
        assert_eq!(session.lock_names(), ["ui", "db"]);

        session.release();
        assert_eq!(locks[0].available(), 2);
        assert_eq!(locks[1].available(), 1);
    }

    #[test]
    fn dropping_a_session_releases_its_locks() {
        let registry = LockRegistry::new("db=1");
        let cancel = CancelToken::new();
        let db = registry.resolve("db").unwrap().remove(0);

        {
            let _session = LockSession::begin(&registry, "db", &cancel, None).unwrap();
            assert_eq!(db.available(), 0);
        }
        assert_eq!(db.available(), 1);
    }

    #[test]
    fn cancelled_begin_holds_nothing() {
        let registry = LockRegistry::new("db=1");
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = LockSession::begin(&registry, "db scratch", &cancel, None);
        assert!(matches!(result, Err(NamelockError::Interrupted(_))));

        let locks = registry.resolve("db scratch").unwrap();
        assert_eq!(locks[0].available(), 1);
        assert_eq!(locks[1].available(), 1);
    }

    #[test]
    fn begin_surfaces_configuration_errors() {
        let registry = LockRegistry::new("db=zero");
        let cancel = CancelToken::new();

        let result = LockSession::begin(&registry, "db", &cancel, None);
        assert!(matches!(result, Err(NamelockError::ConfigError(_))));
    }

    #[test]
    fn with_locks_runs_work_while_holding() {
        let registry = LockRegistry::new("db=1");
        let cancel = CancelToken::new();
        let db = registry.resolve("db").unwrap().remove(0);

        let observed = with_locks(&registry, "db", &cancel, || db.available()).unwrap();
        assert_eq!(observed, 0);
        assert_eq!(db.available(), 1);
    }

    #[test]
    fn overlapping_requests_in_opposite_textual_order_do_not_deadlock() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(LockRegistry::new("alpha=2 beta=1"));

        let mut handles = vec![];
        for request in ["alpha,beta", "beta,alpha"] {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                let cancel = CancelToken::new();
                for _ in 0..200 {
                    with_locks(&registry, request, &cancel, || {}).unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let locks = registry.resolve("alpha beta").unwrap();
        assert_eq!(locks[0].available(), 2);
        assert_eq!(locks[1].available(), 1);
    }

    #[test]
    fn session_records_the_full_event_sequence() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("events.ndjson"));
        let registry = LockRegistry::new("db=1");
        let cancel = CancelToken::new();

        let session =
            LockSession::begin_for_job(&registry, "db", "compile", &cancel, Some(log.clone()))
                .unwrap();
        session.release();

        let events = log.read_all().unwrap();
        let actions: Vec<EventAction> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            [
                EventAction::Resolve,
                EventAction::Acquire,
                EventAction::Acquired,
                EventAction::Release,
                EventAction::Released,
            ]
        );
        assert!(events.iter().all(|e| e.locks == "db"));
        assert!(events.iter().all(|e| e.job.as_deref() == Some("compile")));
    }
}
