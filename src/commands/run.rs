//! The `run` command: execute a plan of jobs under named locks.
//!
//! One worker thread is spawned per job. Each worker begins a lock session
//! for the job's `needs` string, runs the job's command, and releases the
//! session. A failed job does not stop the others; the command reports every
//! outcome and fails overall if any job failed.

use crate::cancel::CancelToken;
use crate::cli::RunArgs;
use crate::error::{NamelockError, Result};
use crate::events::EventLog;
use crate::plan::{Job, Plan};
use crate::registry::LockRegistry;
use crate::session::LockSession;
use std::process::Command;
use std::sync::Arc;
use std::thread;

/// Load a plan, run its jobs concurrently, and report per-job outcomes.
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let plan = Plan::load(&args.plan)?;
    let registry = Arc::new(LockRegistry::new(plan.locks.clone()));
    let events = args.events.map(EventLog::new);
    let cancel = CancelToken::new();

    let total = plan.jobs.len();
    let mut handles = Vec::with_capacity(total);
    for job in plan.jobs {
        let registry = Arc::clone(&registry);
        let events = events.clone();
        let cancel = cancel.clone();
        let name = job.name.clone();
        handles.push((
            name,
            thread::spawn(move || execute_job(&registry, &job, &cancel, events)),
        ));
    }

    let mut failed = Vec::new();
    for (name, handle) in handles {
        match handle.join() {
            Ok(Ok(())) => println!("[{}] ok", name),
            Ok(Err(err)) => {
                eprintln!("[{}] failed: {}", name, err);
                failed.push(name);
            }
            Err(_) => {
                eprintln!("[{}] worker panicked", name);
                failed.push(name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(NamelockError::JobError(format!(
            "{} of {} job(s) failed: {}",
            failed.len(),
            total,
            failed.join(", ")
        )))
    }
}

/// Run one job inside a lock session.
fn execute_job(
    registry: &LockRegistry,
    job: &Job,
    cancel: &CancelToken,
    events: Option<EventLog>,
) -> Result<()> {
    let session = LockSession::begin_for_job(registry, &job.needs, &job.name, cancel, events)?;
    let result = run_command(&job.run);
    session.release();
    result
}

/// Parse and run a job command.
///
/// Uses shell-words to parse the command into an argv array for deterministic
/// execution without invoking a shell.
fn run_command(command: &str) -> Result<()> {
    let argv = shell_words::split(command).map_err(|e| {
        NamelockError::UserError(format!(
            "failed to parse command '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            command, e
        ))
    })?;

    if argv.is_empty() {
        return Err(NamelockError::UserError(format!(
            "command is empty after parsing: '{}'",
            command
        )));
    }

    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .status()
        .map_err(|e| {
            NamelockError::JobError(format!(
                "failed to start '{}': {}\n\
                 Fix: ensure the command is installed and in PATH.",
                command, e
            ))
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(NamelockError::JobError(format!(
            "'{}' exited with {}",
            command, status
        )))
    }
}
