//! Error types for property backends

use std::path::PathBuf;
use tunable_core::BackendError;

/// Errors reading or writing property data
#[derive(Debug, thiserror::Error)]
pub enum PropsError {
    /// IO error on a property file
    #[error("io error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed `.properties` text
    #[error("syntax error at line {line}: {message}")]
    Syntax {
        /// One-based line number
        line: usize,
        /// What is wrong
        message: String,
    },

    /// Malformed JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Well-formed input that is not a flat string map
    #[error("format error: {0}")]
    Format(String),
}

impl PropsError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for a line
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

impl From<PropsError> for BackendError {
    fn from(err: PropsError) -> Self {
        match err {
            PropsError::Io { path, source } => BackendError::Io { path, source },
            other => BackendError::Format(other.to_string()),
        }
    }
}

/// Result alias for property operations
pub type PropsResult<T> = Result<T, PropsError>;
