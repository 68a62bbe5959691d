//! Error types for transcript validation and loading.
//!
//! Both variants are fatal for the current call: the scorer performs no
//! partial work once either is raised.

use std::fmt::Display;
use std::path::Path;

/// Errors from the meter core and its transcript loader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeterError {
    /// The transcript does not have the required rounds/outputs/claims shape.
    #[error("{0}")]
    Structural(String),

    /// Persisted input could not be parsed. `location` is `path` or `path:line`.
    #[error("{location}: {message}")]
    Parse { location: String, message: String },
}

impl MeterError {
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Parse error pinned to a file, with no line information.
    pub fn parse_in(path: &Path, message: impl Display) -> Self {
        Self::Parse {
            location: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Parse error pinned to a 1-based line of a file.
    pub fn parse_at(path: &Path, line: usize, message: impl Display) -> Self {
        Self::Parse {
            location: format!("{}:{}", path.display(), line),
            message: message.to_string(),
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}

/// Result type alias for meter operations.
pub type MeterResult<T> = Result<T, MeterError>;
