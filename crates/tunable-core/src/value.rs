//! Value kinds and their string conversions
//!
//! Every backend speaks strings; each [`ValueKind`] owns the conversion
//! between its typed value and the external text.

use crate::error::{FieldError, SelectionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of value kinds a tunable can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Signed 64-bit integer
    Integer,
    /// Finite 64-bit float
    Float,
    /// Boolean flag
    Boolean,
    /// Free text
    Text,
    /// Bounded single choice from a candidate list
    Choice,
}

impl ValueKind {
    /// Lowercase kind name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Choice => "choice",
        }
    }

    /// Placeholder shown for the value in usage text
    #[inline]
    #[must_use]
    pub fn value_name(self) -> &'static str {
        match self {
            Self::Integer => "INT",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOL",
            Self::Text => "TEXT",
            Self::Choice => "CHOICE",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse external text as an integer
///
/// # Errors
/// Returns [`FieldError::Coercion`] when the text is not a valid `i64`
pub fn parse_integer(raw: &str) -> Result<i64, FieldError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| FieldError::coercion(ValueKind::Integer, raw, e))
}

/// Parse external text as a finite float
///
/// # Errors
/// Returns [`FieldError::Coercion`] for unparseable text and
/// [`FieldError::NonFinite`] for NaN or infinities
pub fn parse_float(raw: &str) -> Result<f64, FieldError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| FieldError::coercion(ValueKind::Float, raw, e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FieldError::NonFinite(value))
    }
}

/// Render a float so that [`parse_float`] reproduces it exactly
///
/// # Errors
/// Returns [`FieldError::NonFinite`] for NaN or infinities
pub fn format_float(value: f64) -> Result<String, FieldError> {
    if value.is_finite() {
        Ok(value.to_string())
    } else {
        Err(FieldError::NonFinite(value))
    }
}

/// Parse external text as a boolean
///
/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, ignoring case.
///
/// # Errors
/// Returns [`FieldError::Coercion`] for anything else
pub fn parse_boolean(raw: &str) -> Result<bool, FieldError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(FieldError::coercion(
            ValueKind::Boolean,
            raw,
            "expected true/false, yes/no, on/off or 1/0",
        )),
    }
}

/// Bounded single-choice value
///
/// Holds a non-empty candidate list and at most one selected candidate.
/// Nothing is selected until [`set_selected`](Self::set_selected) or
/// [`with_selected`](Self::with_selected) is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSingleSelection {
    values: Vec<String>,
    selected: Option<usize>,
}

impl ListSingleSelection {
    /// Create from candidate values
    ///
    /// # Errors
    /// Returns [`SelectionError::EmptyCandidates`] for an empty candidate set
    pub fn new<I, S>(values: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SelectionError::EmptyCandidates);
        }
        Ok(Self {
            values,
            selected: None,
        })
    }

    /// Select a value, builder style
    ///
    /// # Errors
    /// Returns [`SelectionError::NotACandidate`] if `value` is not a candidate
    pub fn with_selected(mut self, value: &str) -> Result<Self, SelectionError> {
        self.set_selected(value)?;
        Ok(self)
    }

    /// Copy of the candidate values
    ///
    /// Mutating the returned vector does not affect this selection.
    #[must_use]
    pub fn possible_values(&self) -> Vec<String> {
        self.values.clone()
    }

    /// Currently selected value
    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.map(|idx| self.values[idx].as_str())
    }

    /// Select a value
    ///
    /// # Errors
    /// Returns [`SelectionError::NotACandidate`] if `value` is not a candidate;
    /// the previous selection is kept
    pub fn set_selected(&mut self, value: &str) -> Result<(), SelectionError> {
        match self.values.iter().position(|candidate| candidate == value) {
            Some(idx) => {
                self.selected = Some(idx);
                Ok(())
            }
            None => Err(SelectionError::NotACandidate {
                value: value.to_string(),
                candidates: self.possible_values(),
            }),
        }
    }

    /// Drop the current selection
    #[inline]
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Check whether `value` is a candidate
    #[inline]
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }

    /// Number of candidates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Never true for a constructed selection
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_parses_with_surrounding_whitespace() {
        assert_eq!(parse_integer(" 42 ").unwrap(), 42);
        assert_eq!(parse_integer("-7").unwrap(), -7);
    }

    #[test]
    fn integer_rejects_garbage() {
        let err = parse_integer("4x2").unwrap_err();
        assert!(matches!(err, FieldError::Coercion { kind: ValueKind::Integer, .. }));
    }

    #[test]
    fn float_rejects_non_finite() {
        assert!(matches!(parse_float("NaN"), Err(FieldError::NonFinite(_))));
        assert!(matches!(parse_float("inf"), Err(FieldError::NonFinite(_))));
        assert!(matches!(format_float(f64::INFINITY), Err(FieldError::NonFinite(_))));
    }

    #[test]
    fn float_formatting_round_trips() {
        for value in [0.1, 1.0, -2.5e-300, 1.0e300, 123_456.789] {
            let text = format_float(value).unwrap();
            assert_eq!(parse_float(&text).unwrap().to_bits(), value.to_bits());
        }
    }

    #[test]
    fn boolean_spellings() {
        assert!(parse_boolean("TRUE").unwrap());
        assert!(parse_boolean("yes").unwrap());
        assert!(parse_boolean("on").unwrap());
        assert!(!parse_boolean("0").unwrap());
        assert!(!parse_boolean("Off").unwrap());
        assert!(parse_boolean("maybe").is_err());
    }

    #[test]
    fn selection_requires_candidates() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            ListSingleSelection::new(empty).unwrap_err(),
            SelectionError::EmptyCandidates
        );
    }

    #[test]
    fn selection_possible_values_is_a_copy() {
        let selection = ListSingleSelection::new(["grid", "circle"]).unwrap();
        let mut values = selection.possible_values();
        values.push("spiral".to_string());
        values[0] = "changed".to_string();

        assert_eq!(selection.possible_values(), vec!["grid", "circle"]);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn selection_starts_empty() {
        let selection = ListSingleSelection::new(["grid"]).unwrap();
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn selection_rejects_unknown_value_and_keeps_previous() {
        let mut selection = ListSingleSelection::new(["grid", "circle"])
            .unwrap()
            .with_selected("circle")
            .unwrap();

        let err = selection.set_selected("spiral").unwrap_err();
        assert!(matches!(err, SelectionError::NotACandidate { .. }));
        assert_eq!(selection.selected(), Some("circle"));
    }

    #[test]
    fn selection_clear() {
        let mut selection = ListSingleSelection::new(["grid"])
            .unwrap()
            .with_selected("grid")
            .unwrap();
        selection.clear_selection();
        assert_eq!(selection.selected(), None);
        assert!(selection.contains("grid"));
    }
}
