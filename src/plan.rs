//! Job plan model for the `namelock run` command.
//!
//! A plan is a YAML file naming the shared lock configuration and the jobs to
//! execute concurrently:
//!
//! ```yaml
//! locks: "db=2 deploy=1"
//! jobs:
//!   - name: migrate
//!     needs: "db deploy"
//!     run: "./scripts/migrate.sh"
//!   - name: unit-tests
//!     needs: "db"
//!     run: "cargo test"
//! ```
//!
//! Unknown fields in the YAML are ignored for forward compatibility.

use crate::error::{NamelockError, Result};
use crate::registry::LockRegistry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A set of jobs sharing one lock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Lock declarations as `name=capacity` tokens (spaces, commas,
    /// semicolons, tabs, or newlines between tokens).
    #[serde(default)]
    pub locks: String,

    /// Jobs to execute, one worker thread each.
    pub jobs: Vec<Job>,
}

/// One job in a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job name, used in output and event records.
    pub name: String,

    /// Lock names this job must hold while running. Empty means no locks.
    #[serde(default)]
    pub needs: String,

    /// Command line to execute, parsed with shell quoting rules.
    pub run: String,
}

impl Plan {
    /// Load a plan from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            NamelockError::UserError(format!(
                "failed to read plan file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a plan from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let plan: Plan = serde_yaml::from_str(yaml)
            .map_err(|e| NamelockError::UserError(format!("failed to parse plan YAML: {}", e)))?;

        plan.validate()?;
        Ok(plan)
    }

    /// Validate plan values.
    ///
    /// Validation rules:
    /// - the lock configuration must parse
    /// - at least one job
    /// - job names must be non-empty and unique
    /// - job commands must be non-empty
    pub fn validate(&self) -> Result<()> {
        LockRegistry::validate(&self.locks)?;

        if self.jobs.is_empty() {
            return Err(NamelockError::UserError(
                "plan validation failed: at least one job is required".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for job in &self.jobs {
            if job.name.trim().is_empty() {
                return Err(NamelockError::UserError(
                    "plan validation failed: job names must be non-empty".to_string(),
                ));
            }
            if !seen.insert(job.name.as_str()) {
                return Err(NamelockError::UserError(format!(
                    "plan validation failed: duplicate job name '{}'",
                    job.name
                )));
            }
            if job.run.trim().is_empty() {
                return Err(NamelockError::UserError(format!(
                    "plan validation failed: job '{}' has an empty run command",
                    job.name
                )));
            }
        }

        Ok(())
    }
}
