//! Error types for the provenance log

/// Errors from the provenance log
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// Hash chain is broken at an entry
    #[error("integrity violation at entry {seq}: {reason}")]
    IntegrityViolation {
        /// Sequence number of the first bad entry
        seq: u64,
        /// Which check failed
        reason: &'static str,
    },

    /// JSON export or import failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for provenance operations
pub type ProvenanceResult<T> = Result<T, ProvenanceError>;
