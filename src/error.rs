//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum StrataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // Terminal / event loop
    // ─────────────────────────────────────────────────────────────
    #[error("STRATA-010: Terminal error: {reason}")]
    TuiError { reason: String },

    #[error("STRATA-011: Fatal error in event loop: {reason}")]
    Fatal { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration / themes
    // ─────────────────────────────────────────────────────────────
    #[error("STRATA-020: Config error: {reason}")]
    ConfigError { reason: String },

    #[error("STRATA-021: Theme error: {reason}")]
    ThemeError { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Background tasks
    // ─────────────────────────────────────────────────────────────
    #[error("STRATA-030: Task failed: {reason}")]
    TaskFailed { reason: String },

    #[error("STRATA-031: Task cancelled")]
    TaskCancelled,
}

impl FixSuggestion for StrataError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            StrataError::Io(_) => Some("Check file path and permissions"),
            StrataError::Yaml(_) => Some("Check YAML syntax: indentation and quoting"),
            StrataError::TuiError { .. } => {
                Some("Run inside an interactive terminal (not a pipe or CI log)")
            }
            StrataError::Fatal { .. } => Some("Re-run with STRATA_LOG=debug and inspect the log file"),
            StrataError::ConfigError { .. } => {
                Some("Fix or delete the config file; defaults are used when it is missing")
            }
            StrataError::ThemeError { .. } => Some("Run `strata themes` to list available themes"),
            StrataError::TaskFailed { .. } => None,
            StrataError::TaskCancelled => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;

impl StrataError {
    /// Wrap any displayable failure as a terminal error
    pub fn tui(reason: impl std::fmt::Display) -> Self {
        StrataError::TuiError {
            reason: reason.to_string(),
        }
    }

    /// Wrap any displayable failure as a task failure
    pub fn task(reason: impl std::fmt::Display) -> Self {
        StrataError::TaskFailed {
            reason: reason.to_string(),
        }
    }

    /// True for a user-initiated cancellation, which dialogs do not report
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StrataError::TaskCancelled)
    }
}
