//! Shared error types for the application

use thiserror::Error;

/// Main error type for churnmap operations
#[derive(Debug, Error)]
pub enum ChurnError {
    /// Malformed VCS log input (bad header, stat line, date or rename syntax)
    #[error("Parse error at line {line_number}: {message}: {line:?}")]
    Parse {
        line_number: usize,
        line: String,
        message: String,
    },

    /// A rename alias chain revisited a name it already passed through
    #[error("Rename alias cycle detected while resolving {file:?}")]
    RenameCycle { file: String },

    /// A commit that violates the input contract (missing filename or date)
    #[error("Invalid changeset {changeset}: {message}")]
    InvalidChangeset { changeset: String, message: String },

    /// Configuration errors (invalid bug-pattern regex, bad config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External VCS process failures (spawn error, non-zero exit)
    #[error("Process error: {0}")]
    Process(String),
}

impl ChurnError {
    pub fn parse(line_number: usize, line: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            line_number,
            line: line.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChurnError>;
