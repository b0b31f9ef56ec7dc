//! CLI argument parsing for namelock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Namelock: named capacity-bounded locks for coordinating concurrent build jobs.
///
/// Jobs declare the lock names they need; namelock serializes or
/// capacity-limits them against other jobs needing the same names,
/// acquiring multi-lock requests in a deadlock-free global order.
#[derive(Parser, Debug)]
#[command(name = "namelock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for namelock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate lock configuration text.
    ///
    /// Parses `name=capacity` declarations and reports the first malformed
    /// token without installing anything.
    Check(CheckArgs),

    /// Run a plan of jobs concurrently under named locks.
    ///
    /// Spawns one worker thread per job; each job holds its declared locks
    /// for the duration of its command.
    Run(RunArgs),
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Configuration text to validate (e.g., "db=2 deploy=1").
    pub config: Option<String>,

    /// Read the configuration text from a file instead.
    #[arg(long, conflicts_with = "config")]
    pub file: Option<PathBuf>,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the plan YAML file.
    pub plan: PathBuf,

    /// Append lock lifecycle events to this NDJSON file.
    #[arg(long)]
    pub events: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
