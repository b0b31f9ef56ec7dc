//! Lock event logging.
//!
//! Lock sessions emit an observable event at each lifecycle transition:
//! resolving a request, attempting acquisition, acquisition complete,
//! attempting release, release complete. Events are an auditable operational
//! trace, not a correctness mechanism; nothing in the locking core depends
//! on them.
//!
//! Events are stored in NDJSON format (one JSON object per line). Each event
//! carries:
//! - `ts`: RFC3339 timestamp
//! - `action`: the lifecycle transition
//! - `actor`: the emitting identity (`user@HOST`)
//! - `locks`: the raw lock-request text
//! - `job`: optional job name for runner-driven sessions

use crate::error::{NamelockError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Lifecycle transitions logged by a lock session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Request text is being resolved against the registry.
    Resolve,
    /// Blocking acquisition has started.
    Acquire,
    /// Every requested lock is now held.
    Acquired,
    /// Release has started.
    Release,
    /// Every held lock has been returned.
    Released,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Resolve => write!(f, "resolve"),
            EventAction::Acquire => write!(f, "acquire"),
            EventAction::Acquired => write!(f, "acquired"),
            EventAction::Release => write!(f, "release"),
            EventAction::Released => write!(f, "released"),
        }
    }
}

/// One record in the lock audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The lifecycle transition.
    pub action: EventAction,

    /// Who emitted the event (e.g., `user@HOST`).
    pub actor: String,

    /// The raw lock-request text of the session.
    pub locks: String,

    /// Optional job name for runner-driven sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

impl Event {
    /// Create a new event for the given transition and request text.
    pub fn new(action: EventAction, locks: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            locks: locks.into(),
            job: None,
        }
    }

    /// Tag this event with a job name.
    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| NamelockError::UserError(format!("failed to serialize event: {}", e)))
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append-only NDJSON event file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Create a log writing to the given file path.
    ///
    /// The file and its parent directory are created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying NDJSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single JSON line.
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;

        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                NamelockError::UserError(format!(
                    "failed to create events directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                NamelockError::UserError(format!(
                    "failed to open events file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            NamelockError::UserError(format!(
                "failed to write event to '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Read every event recorded so far, oldest first.
    ///
    /// A missing file reads as an empty trail.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(NamelockError::UserError(format!(
                    "failed to read events file '{}': {}",
                    self.path.display(),
                    e
                )));
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    NamelockError::UserError(format!(
                        "failed to parse event line '{}': {}",
                        line, e
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn event_creation_fills_timestamp_and_actor() {
        let event = Event::new(EventAction::Acquire, "db ui");

        assert_eq!(event.action, EventAction::Acquire);
        assert_eq!(event.locks, "db ui");
        assert!(event.actor.contains('@'));
        assert!(event.job.is_none());
        // Timestamp should be recent (within last minute)
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn event_serializes_as_a_single_json_line() {
        let event = Event::new(EventAction::Acquired, "db").with_job("compile");
        let line = event.to_ndjson_line().unwrap();

        assert!(!line.contains('\n'));
        assert!(line.contains("\"acquired\""));
        assert!(line.contains("\"compile\""));

        let parsed: Event = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.action, EventAction::Acquired);
        assert_eq!(parsed.job.as_deref(), Some("compile"));
    }

    #[test]
    fn job_field_is_omitted_when_absent() {
        let event = Event::new(EventAction::Release, "db");
        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains("\"job\""));
    }

    #[test]
    fn append_and_read_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("events.ndjson"));

        log.append(&Event::new(EventAction::Acquire, "db")).unwrap();
        log.append(&Event::new(EventAction::Acquired, "db")).unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::Acquire);
        assert_eq!(events[1].action, EventAction::Acquired);
    }

    #[test]
    fn append_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("nested/dir/events.ndjson"));

        log.append(&Event::new(EventAction::Resolve, "db")).unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn reading_a_missing_file_yields_no_events() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("absent.ndjson"));
        assert!(log.read_all().unwrap().is_empty());
    }
}
