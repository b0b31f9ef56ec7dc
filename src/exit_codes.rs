//! Exit code constants for the namelock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable input)
//! - 2: Configuration failure (malformed lock declarations)
//! - 3: Acquisition interrupted
//! - 4: One or more jobs failed

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or unreadable input files.
pub const USER_ERROR: i32 = 1;

/// Configuration failure: malformed `name=capacity` declarations.
pub const CONFIG_FAILURE: i32 = 2;

/// A blocking lock acquisition was cancelled.
pub const INTERRUPTED: i32 = 3;

/// One or more jobs failed to start or exited non-zero.
pub const JOB_FAILURE: i32 = 4;
