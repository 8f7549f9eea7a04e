//! Batch outcome reporting

use crate::error::FieldError;
use crate::target::TargetId;

/// One field that failed during a batch
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFailure {
    /// Owning object
    pub target: TargetId,
    /// External key
    pub key: String,
    /// What went wrong
    pub error: FieldError,
}

/// Outcome of a load or store call
///
/// Only returned when the call as a whole succeeded; per-field problems are
/// listed here instead of failing the call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Keys transferred
    pub applied: Vec<String>,
    /// Keys the source had no value for
    pub untouched: Vec<String>,
    /// Per-field failures
    pub failures: Vec<FieldFailure>,
    /// Targets skipped under the tolerant policy
    pub skipped_targets: Vec<TargetId>,
}

impl BatchReport {
    /// Check if nothing failed or was skipped
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped_targets.is_empty()
    }

    /// Failure recorded for `key`
    #[must_use]
    pub fn failure_for(&self, key: &str) -> Option<&FieldFailure> {
        self.failures.iter().find(|f| f.key == key)
    }

    /// Check if `key` was transferred
    #[inline]
    #[must_use]
    pub fn was_applied(&self, key: &str) -> bool {
        self.applied.iter().any(|k| k == key)
    }

    /// Append another report
    pub fn merge(&mut self, other: BatchReport) {
        self.applied.extend(other.applied);
        self.untouched.extend(other.untouched);
        self.failures.extend(other.failures);
        self.skipped_targets.extend(other.skipped_targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::shared;

    #[test]
    fn empty_report_is_clean() {
        assert!(BatchReport::default().is_clean());
    }

    #[test]
    fn failure_lookup_and_merge() {
        let target = TargetId::of(&shared(()));
        let mut report = BatchReport {
            applied: vec!["a.x".to_string()],
            ..BatchReport::default()
        };
        report.merge(BatchReport {
            failures: vec![FieldFailure {
                target,
                key: "a.y".to_string(),
                error: FieldError::NoSelection,
            }],
            ..BatchReport::default()
        });

        assert!(!report.is_clean());
        assert!(report.was_applied("a.x"));
        assert_eq!(report.failure_for("a.y").unwrap().error, FieldError::NoSelection);
        assert!(report.failure_for("a.x").is_none());
    }
}
