//! Per-field handlers
//!
//! A handler binds one declaration site of one object to its external key.
//! It converts between the field's typed value and external text and never
//! keeps the object alive.

use crate::declaration::{Binding, Site, TunableMeta};
use crate::error::FieldError;
use crate::target::Shared;
use crate::value::{self, ValueKind};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// Type-erased handler stored in the interceptor registry
pub trait TunableHandler: Send + Sync {
    /// External key, `namespace.field`
    fn key(&self) -> &str;

    /// Field name
    fn field(&self) -> &str;

    /// Declaration metadata
    fn meta(&self) -> &TunableMeta;

    /// Value kind
    fn kind(&self) -> ValueKind;

    /// Read the field as external text
    ///
    /// # Errors
    /// Returns a [`FieldError`] if the value cannot be represented or the
    /// target is gone
    fn read(&self) -> Result<String, FieldError>;

    /// Convert external text and write it into the field
    ///
    /// On error the field keeps its previous value.
    ///
    /// # Errors
    /// Returns a [`FieldError`] if the text does not convert or the target
    /// is gone
    fn write(&self, raw: &str) -> Result<(), FieldError>;

    /// Candidate values for choice fields
    fn possible_values(&self) -> Option<Vec<String>> {
        None
    }

    /// Whether the bound object still exists
    fn is_live(&self) -> bool;
}

impl fmt::Debug for dyn TunableHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunableHandler")
            .field("key", &self.key())
            .field("kind", &self.kind())
            .field("live", &self.is_live())
            .finish()
    }
}

/// Handler for a field of `T`, dispatching on its [`Binding`]
pub struct FieldHandler<T> {
    key: String,
    kind: ValueKind,
    site: Site<T>,
    target: Weak<RwLock<T>>,
}

impl<T> FieldHandler<T> {
    /// Bind `site` of `target`
    ///
    /// Returns `None` for unsupported bindings.
    #[must_use]
    pub fn new(target: &Shared<T>, site: &Site<T>) -> Option<Self> {
        let kind = site.binding().kind()?;
        Some(Self {
            key: site.key(),
            kind,
            site: site.clone(),
            target: Arc::downgrade(target),
        })
    }

    fn upgrade(&self) -> Result<Shared<T>, FieldError> {
        self.target.upgrade().ok_or(FieldError::TargetDropped)
    }
}

impl<T> fmt::Debug for FieldHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHandler")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> TunableHandler for FieldHandler<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn field(&self) -> &str {
        self.site.name()
    }

    fn meta(&self) -> &TunableMeta {
        self.site.meta()
    }

    fn kind(&self) -> ValueKind {
        self.kind
    }

    fn read(&self) -> Result<String, FieldError> {
        let target = self.upgrade()?;
        let guard = target.read();
        match self.site.binding() {
            Binding::Integer { get, .. } => Ok(get(&*guard).to_string()),
            Binding::Float { get, .. } => value::format_float(get(&*guard)),
            Binding::Boolean { get, .. } => Ok(get(&*guard).to_string()),
            Binding::Text { get, .. } => Ok(get(&*guard)),
            Binding::Choice { get, .. } => get(&*guard)
                .selected()
                .map(str::to_string)
                .ok_or(FieldError::NoSelection),
            Binding::Unsupported { type_name } => Err(FieldError::Unsupported(type_name)),
        }
    }

    fn write(&self, raw: &str) -> Result<(), FieldError> {
        let target = self.upgrade()?;
        // Convert before taking the write lock so a bad value never touches the field.
        match self.site.binding() {
            Binding::Integer { set, .. } => {
                let parsed = value::parse_integer(raw)?;
                set(&mut *target.write(), parsed);
            }
            Binding::Float { set, .. } => {
                let parsed = value::parse_float(raw)?;
                set(&mut *target.write(), parsed);
            }
            Binding::Boolean { set, .. } => {
                let parsed = value::parse_boolean(raw)?;
                set(&mut *target.write(), parsed);
            }
            Binding::Text { set, .. } => set(&mut *target.write(), raw.to_string()),
            Binding::Choice { get_mut, .. } => {
                let mut guard = target.write();
                let selection = get_mut(&mut *guard);
                // Exact text first; candidates may carry their own padding.
                let text = if selection.contains(raw) { raw } else { raw.trim() };
                selection.set_selected(text)?;
            }
            Binding::Unsupported { type_name } => return Err(FieldError::Unsupported(type_name)),
        }
        Ok(())
    }

    fn possible_values(&self) -> Option<Vec<String>> {
        match self.site.binding() {
            Binding::Choice { get, .. } => {
                let target = self.target.upgrade()?;
                let guard = target.read();
                Some(get(&*guard).possible_values())
            }
            _ => None,
        }
    }

    fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{Schema, Tunable};
    use crate::target::shared;
    use crate::value::ListSingleSelection;
    use crate::TunableMeta;

    struct Sample {
        count: i64,
        ratio: f64,
        mode: ListSingleSelection,
    }

    impl Tunable for Sample {
        fn declare(&self, schema: &mut Schema<Self>) {
            schema
                .integer("count", TunableMeta::new("sample", "Count"), |s| s.count, |s, v| s.count = v)
                .float("ratio", TunableMeta::new("sample", "Ratio"), |s| s.ratio, |s, v| s.ratio = v)
                .choice("mode", TunableMeta::new("sample", "Mode"), |s| &s.mode, |s| &mut s.mode)
                .unsupported("shape", TunableMeta::new("sample", "Shape"), "Shape");
        }
    }

    fn fixture() -> (Shared<Sample>, Vec<Site<Sample>>) {
        let target = shared(Sample {
            count: 5,
            ratio: 0.5,
            mode: ListSingleSelection::new(["a", "b"]).unwrap(),
        });
        let sites = Schema::of(&*target.read()).into_sites();
        (target, sites)
    }

    #[test]
    fn integer_read_write() {
        let (target, sites) = fixture();
        let handler = FieldHandler::new(&target, &sites[0]).unwrap();

        assert_eq!(handler.key(), "sample.count");
        assert_eq!(handler.read().unwrap(), "5");
        handler.write("12").unwrap();
        assert_eq!(target.read().count, 12);
    }

    #[test]
    fn failed_write_keeps_value() {
        let (target, sites) = fixture();
        let handler = FieldHandler::new(&target, &sites[0]).unwrap();

        assert!(handler.write("twelve").is_err());
        assert_eq!(target.read().count, 5);
    }

    #[test]
    fn non_finite_float_cannot_be_read() {
        let (target, sites) = fixture();
        let handler = FieldHandler::new(&target, &sites[1]).unwrap();

        target.write().ratio = f64::NAN;
        assert!(matches!(handler.read(), Err(FieldError::NonFinite(_))));
    }

    #[test]
    fn choice_without_selection_cannot_be_read() {
        let (target, sites) = fixture();
        let handler = FieldHandler::new(&target, &sites[2]).unwrap();

        assert_eq!(handler.read().unwrap_err(), FieldError::NoSelection);
        handler.write("b").unwrap();
        assert_eq!(handler.read().unwrap(), "b");
        assert_eq!(handler.possible_values(), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn choice_rejects_non_candidate() {
        let (target, sites) = fixture();
        let handler = FieldHandler::new(&target, &sites[2]).unwrap();

        assert!(matches!(handler.write("c"), Err(FieldError::Selection(_))));
        assert_eq!(target.read().mode.selected(), None);
    }

    #[test]
    fn choice_matches_padded_candidate_exactly() {
        let target = shared(Sample {
            count: 0,
            ratio: 0.0,
            mode: ListSingleSelection::new([" padded", "plain"]).unwrap(),
        });
        let sites = Schema::of(&*target.read()).into_sites();
        let handler = FieldHandler::new(&target, &sites[2]).unwrap();

        handler.write(" padded").unwrap();
        assert_eq!(handler.read().unwrap(), " padded");
        handler.write("  plain ").unwrap();
        assert_eq!(handler.read().unwrap(), "plain");
    }

    #[test]
    fn unsupported_site_has_no_handler() {
        let (target, sites) = fixture();
        assert!(FieldHandler::new(&target, &sites[3]).is_none());
    }

    #[test]
    fn handler_does_not_keep_target_alive() {
        let (target, sites) = fixture();
        let handler = FieldHandler::new(&target, &sites[0]).unwrap();
        assert!(handler.is_live());

        drop(target);
        assert!(!handler.is_live());
        assert_eq!(handler.read().unwrap_err(), FieldError::TargetDropped);
        assert_eq!(handler.write("1").unwrap_err(), FieldError::TargetDropped);
    }
}
