//! Error types for the namelock library and CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for namelock operations.
///
/// Each variant maps to a specific exit code so the CLI can report
/// distinguishable failure classes to the calling orchestration.
#[derive(Error, Debug)]
pub enum NamelockError {
    /// User provided invalid arguments or input files.
    #[error("{0}")]
    UserError(String),

    /// Lock configuration text could not be parsed.
    #[error("Invalid lock configuration: {0}")]
    ConfigError(String),

    /// A blocking acquire was cancelled before a slot became available.
    #[error("Lock acquisition interrupted while waiting for '{0}'")]
    Interrupted(String),

    /// A job command failed to start or exited non-zero.
    #[error("Job failed: {0}")]
    JobError(String),
}

impl NamelockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            NamelockError::UserError(_) => exit_codes::USER_ERROR,
            NamelockError::ConfigError(_) => exit_codes::CONFIG_FAILURE,
            NamelockError::Interrupted(_) => exit_codes::INTERRUPTED,
            NamelockError::JobError(_) => exit_codes::JOB_FAILURE,
        }
    }
}

/// Result type alias for namelock operations.
pub type Result<T> = std::result::Result<T, NamelockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = NamelockError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn config_error_has_correct_exit_code() {
        let err = NamelockError::ConfigError("invalid capacity".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_FAILURE);
    }

    #[test]
    fn interrupted_has_correct_exit_code() {
        let err = NamelockError::Interrupted("db".to_string());
        assert_eq!(err.exit_code(), exit_codes::INTERRUPTED);
    }

    #[test]
    fn job_error_has_correct_exit_code() {
        let err = NamelockError::JobError("compile exited with code 1".to_string());
        assert_eq!(err.exit_code(), exit_codes::JOB_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = NamelockError::ConfigError("invalid capacity: 'x=0'".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid lock configuration: invalid capacity: 'x=0'"
        );

        let err = NamelockError::Interrupted("db".to_string());
        assert_eq!(
            err.to_string(),
            "Lock acquisition interrupted while waiting for 'db'"
        );
    }
}
