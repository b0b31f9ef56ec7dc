//! Registry of named semaphores built from configuration text.
//!
//! The configuration is a single string of tokens separated by any of
//! space, comma, semicolon, tab, or newline. A `name=capacity` token declares
//! a lock with a fixed positive capacity; a bare `name` token is ignored at
//! declaration time (bare names are only meaningful in per-job requests).
//!
//! The name→semaphore map is built lazily, exactly once, from the text the
//! registry was constructed with. Request resolution looks names up in the
//! cached map and auto-creates capacity-1 entries for names that were never
//! declared. Entries live as long as the registry; they are never removed,
//! so every request referencing a name observes the same semaphore instance.

use crate::composite::{CompositeLock, JobLock};
use crate::error::{NamelockError, Result};
use crate::semaphore::NamedSemaphore;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// Characters that separate tokens in configuration and request text.
const SEPARATORS: [char; 5] = [' ', ',', ';', '\t', '\n'];

/// Split configuration or request text into non-empty tokens.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(SEPARATORS).filter(|token| !token.is_empty())
}

/// Parse configuration text into a fresh name→semaphore map.
///
/// Pure with respect to registry state: the returned map is newly built and
/// nothing is installed. Tokens without `=` are skipped; `name=capacity`
/// tokens declare a semaphore with the given capacity. Errors identify the
/// offending token:
/// - `=` at position 0 (empty lock name)
/// - non-numeric capacity
/// - capacity of zero
pub fn parse_configuration(text: &str) -> Result<DashMap<String, Arc<NamedSemaphore>>> {
    let map = DashMap::new();

    for token in tokenize(text) {
        let Some(index) = token.find('=') else {
            // Request-only entry, not a capacity declaration.
            continue;
        };
        if index == 0 {
            return Err(NamelockError::ConfigError(format!(
                "empty lock name in declaration: '{}'",
                token
            )));
        }

        let name = &token[..index];
        let value = &token[index + 1..];
        let capacity = value.parse::<usize>().ok().filter(|&c| c >= 1).ok_or_else(|| {
            NamelockError::ConfigError(format!(
                "capacity must be a positive integer: '{}'",
                token
            ))
        })?;

        // Duplicate declarations keep the last one, like repeated map inserts.
        map.insert(
            name.to_string(),
            Arc::new(NamedSemaphore::new(name, capacity)),
        );
    }

    Ok(map)
}

/// Registry mapping lock names to shared semaphores.
///
/// Shared across worker threads behind `Arc`; all operations take `&self`.
#[derive(Debug)]
pub struct LockRegistry {
    config_text: String,
    locks: OnceLock<DashMap<String, Arc<NamedSemaphore>>>,
}

impl LockRegistry {
    /// Create a registry for the given configuration text.
    ///
    /// The text is not parsed until the first request resolves; use
    /// [`LockRegistry::validate`] for pre-flight feedback.
    pub fn new(config_text: impl Into<String>) -> Self {
        Self {
            config_text: config_text.into(),
            locks: OnceLock::new(),
        }
    }

    /// Check configuration text without touching any registry state.
    pub fn validate(config_text: &str) -> Result<()> {
        parse_configuration(config_text).map(|_| ())
    }

    /// Build the cached map from the configured text, exactly once.
    ///
    /// Concurrent first callers may each parse the text, but only one result
    /// is committed; the losers observe the winner's map. Subsequent calls
    /// return the cached map without re-parsing.
    fn ensure_built(&self) -> Result<&DashMap<String, Arc<NamedSemaphore>>> {
        if let Some(map) = self.locks.get() {
            return Ok(map);
        }
        let built = parse_configuration(&self.config_text)?;
        Ok(self.locks.get_or_init(|| built))
    }

    /// Resolve request text into semaphores, in request order.
    ///
    /// Names absent from the configuration are auto-created with capacity 1.
    /// Creation is atomic per name: concurrent resolution of the same
    /// never-before-seen name yields one semaphore instance for everyone.
    pub fn resolve(&self, request: &str) -> Result<Vec<Arc<NamedSemaphore>>> {
        let locks = self.ensure_built()?;

        let mut resolved = Vec::new();
        for token in tokenize(request) {
            let entry = locks
                .entry(token.to_string())
                .or_insert_with(|| Arc::new(NamedSemaphore::new(token, 1)));
            resolved.push(entry.value().clone());
        }
        Ok(resolved)
    }

    /// Resolve request text into a single acquirable lock.
    ///
    /// A request naming exactly one lock gets that semaphore directly;
    /// anything else is grouped into a [`CompositeLock`] that acquires its
    /// members in the global deadlock-free order.
    pub fn take(&self, request: &str) -> Result<JobLock> {
        let mut resolved = self.resolve(request)?;
        if resolved.len() == 1 {
            // Single resolved name skips the composite wrapper.
            return Ok(JobLock::Single(resolved.remove(0)));
        }
        Ok(JobLock::Composite(CompositeLock::new(resolved)))
    }
}
