//! Named, capacity-bounded mutual-exclusion locks shared across concurrent
//! build jobs.
//!
//! Jobs declare the lock names they need ("I need `db` and `deploy`") and are
//! serialized or capacity-limited against other jobs needing the same names,
//! without managing semaphores directly. Locks are in-process only: the unit
//! of sharing is a [`LockRegistry`] kept alive by the host and shared across
//! worker threads.
//!
//! # Configuration and requests
//!
//! One global configuration string declares capacities: `name=capacity`
//! tokens separated by spaces, commas, semicolons, tabs, or newlines, e.g.
//! `"db=2 deploy=1"`. Per-job request strings use the same separators and
//! list bare names; a requested name that was never declared is
//! auto-provisioned with capacity 1.
//!
//! # Deadlock avoidance
//!
//! A request naming several locks is grouped into a [`CompositeLock`] that
//! acquires its members in one global order (ascending capacity, name as
//! tie-break). Overlapping concurrent requests contend on shared members in
//! the same sequence, so no cyclic wait can form.
//!
//! # Usage
//!
//! ```no_run
//! use namelock::{CancelToken, LockRegistry, LockSession};
//!
//! let registry = LockRegistry::new("db=2 deploy=1");
//! let cancel = CancelToken::new();
//!
//! let session = LockSession::begin(&registry, "db,deploy", &cancel, None)?;
//! // ... protected work ...
//! session.release();
//! # Ok::<(), namelock::NamelockError>(())
//! ```

pub mod cancel;
pub mod cli;
pub mod commands;
pub mod composite;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod plan;
pub mod registry;
pub mod semaphore;
pub mod session;

pub use cancel::CancelToken;
pub use composite::{CompositeLock, JobLock};
pub use error::{NamelockError, Result};
pub use events::{Event, EventAction, EventLog};
pub use plan::{Job, Plan};
pub use registry::LockRegistry;
pub use semaphore::NamedSemaphore;
pub use session::{LockSession, with_locks};
