//! Error types for tunable interception
//!
//! Errors are split by blast radius:
//! - [`FieldError`]: one field failed; the batch carries on
//! - [`InterceptError`]: the whole call failed and nothing further is applied
//! - [`BackendError`]: raised by a source or sink implementation
//! - [`SelectionError`]: misuse of a bounded single-choice value

use crate::target::TargetId;
use crate::value::ValueKind;
use std::path::PathBuf;

/// Errors constructing or updating a [`ListSingleSelection`](crate::ListSingleSelection)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Candidate set was empty
    #[error("a single-choice list needs at least one possible value")]
    EmptyCandidates,

    /// Value is not part of the candidate set
    #[error("'{value}' is not one of the possible values: {}", .candidates.join(", "))]
    NotACandidate {
        /// Rejected value
        value: String,
        /// Allowed values
        candidates: Vec<String>,
    },
}

/// Failure isolated to a single tunable field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// External text could not be converted to the field's kind
    #[error("cannot convert '{value}' to {kind}: {reason}")]
    Coercion {
        /// Target kind
        kind: ValueKind,
        /// Offending external text
        value: String,
        /// Parser message
        reason: String,
    },

    /// Choice value outside the candidate set
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A single-choice field has nothing selected
    #[error("no value selected")]
    NoSelection,

    /// NaN or infinite float
    #[error("non-finite value {0} cannot be represented")]
    NonFinite(f64),

    /// The bound object no longer exists
    #[error("target object has been dropped")]
    TargetDropped,

    /// Declared type has no conversion
    #[error("unsupported field type {0}")]
    Unsupported(&'static str),

    /// Sink refused the value
    #[error("sink rejected value: {0}")]
    Rejected(String),
}

impl FieldError {
    /// Create a coercion error
    pub fn coercion(kind: ValueKind, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Coercion {
            kind,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by source and sink implementations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// IO failure on a backing file
    #[error("io error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Backing data is malformed or cannot be represented
    #[error("format error: {0}")]
    Format(String),

    /// A single value was refused
    #[error("value rejected for '{key}': {reason}")]
    Rejected {
        /// External key
        key: String,
        /// Why
        reason: String,
    },

    /// Backend-specific error
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Batch-fatal interceptor errors
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    /// Target was never registered, was unregistered, or has been dropped
    #[error("{0} is not registered")]
    Unregistered(TargetId),

    /// Declaration metadata is incomplete
    #[error("invalid declaration for '{field}': {reason}")]
    InvalidDeclaration {
        /// Field name
        field: String,
        /// What is wrong
        reason: String,
    },

    /// Two sites of one declaration list map to the same key
    #[error("duplicate tunable key '{0}'")]
    DuplicateKey(String),

    /// Factory declined a site and the policy forbids skipping it
    #[error("unsupported tunable '{key}' of type {type_name}")]
    UnsupportedField {
        /// External key
        key: String,
        /// Declared type
        type_name: String,
    },

    /// No handler with this key on the target
    #[error("no tunable '{key}' registered on {target}")]
    UnknownKey {
        /// Target queried
        target: TargetId,
        /// Missing key
        key: String,
    },

    /// Single-field operation failed
    #[error("field '{key}': {source}")]
    Field {
        /// External key
        key: String,
        /// Field failure
        #[source]
        source: FieldError,
    },

    /// Source or sink failed as a whole
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type alias for interceptor operations
pub type InterceptResult<T> = Result<T, InterceptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_error_lists_candidates() {
        let err = SelectionError::NotACandidate {
            value: "spiral".to_string(),
            candidates: vec!["grid".to_string(), "circle".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "'spiral' is not one of the possible values: grid, circle"
        );
    }

    #[test]
    fn coercion_error_display() {
        let err = FieldError::coercion(ValueKind::Integer, "abc", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "cannot convert 'abc' to integer: invalid digit found in string"
        );
    }

    #[test]
    fn selection_error_converts_to_field_error() {
        let field: FieldError = SelectionError::EmptyCandidates.into();
        assert!(matches!(field, FieldError::Selection(SelectionError::EmptyCandidates)));
    }

    #[test]
    fn backend_error_converts_to_intercept_error() {
        let err: InterceptError = BackendError::Format("nested value".to_string()).into();
        assert!(matches!(err, InterceptError::Backend(_)));
        assert_eq!(err.to_string(), "backend error: format error: nested value");
    }
}
