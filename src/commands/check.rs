//! The `check` command: pre-flight validation of lock configuration text.

use crate::cli::CheckArgs;
use crate::error::{NamelockError, Result};
use crate::registry;

/// Validate configuration text from the command line or a file.
///
/// Parsing happens against a throwaway map; nothing is installed, so a
/// check can run any number of times before or between real runs without
/// affecting the capacities a later run resolves.
pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let text = match (args.config, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
            NamelockError::UserError(format!(
                "failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?,
        (None, None) => {
            return Err(NamelockError::UserError(
                "provide configuration text or --file <path>".to_string(),
            ));
        }
    };

    let declared = registry::parse_configuration(&text)?;
    println!("Configuration OK: {} declared lock(s)", declared.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(config: Option<&str>, file: Option<std::path::PathBuf>) -> CheckArgs {
        CheckArgs {
            config: config.map(str::to_string),
            file,
        }
    }

    #[test]
    fn accepts_valid_inline_configuration() {
        assert!(cmd_check(args(Some("db=2 ui=1 staging"), None)).is_ok());
    }

    #[test]
    fn reports_the_offending_token() {
        let err = cmd_check(args(Some("db=2 ui=none"), None)).unwrap_err();
        assert!(matches!(err, NamelockError::ConfigError(_)));
        assert!(err.to_string().contains("'ui=none'"));
    }

    #[test]
    fn reads_configuration_from_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locks.txt");
        std::fs::write(&path, "db=2\nui=1\n").unwrap();

        assert!(cmd_check(args(None, Some(path))).is_ok());
    }

    #[test]
    fn missing_input_is_a_user_error() {
        let err = cmd_check(args(None, None)).unwrap_err();
        assert!(matches!(err, NamelockError::UserError(_)));
    }

    #[test]
    fn unreadable_file_is_a_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = cmd_check(args(None, Some(temp_dir.path().join("absent.txt")))).unwrap_err();
        assert!(matches!(err, NamelockError::UserError(_)));
    }
}
