//! Tunable declarations
//!
//! A host type implements [`Tunable`] and lists its externally settable
//! fields on a [`Schema`]. Each entry becomes a [`Site`]: field name,
//! [`TunableMeta`], and a [`Binding`] of plain accessor functions.
//!
//! # Example
//!
//! ```rust
//! use tunable_core::{Schema, Tunable, TunableMeta};
//!
//! struct Spring {
//!     iterations: i64,
//! }
//!
//! impl Tunable for Spring {
//!     fn declare(&self, schema: &mut Schema<Self>) {
//!         schema.integer(
//!             "iterations",
//!             TunableMeta::new("spring", "Number of relaxation passes"),
//!             |s| s.iterations,
//!             |s, v| s.iterations = v,
//!         );
//!     }
//! }
//! ```

use crate::value::{ListSingleSelection, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Object exposing tunable fields
///
/// `declare` runs on every registration, so the list may depend on the
/// object's current state.
pub trait Tunable: Send + Sync + 'static {
    /// Record this object's tunable sites
    fn declare(&self, schema: &mut Schema<Self>)
    where
        Self: Sized;
}

/// Metadata attached to one declaration site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunableMeta {
    /// Key prefix
    pub namespace: String,

    /// Human-readable label
    pub description: String,

    /// Display group for forms and usage text
    #[serde(default)]
    pub group: Option<String>,

    /// Excluded from usage text and forms; still loaded and stored
    #[serde(default)]
    pub hidden: bool,
}

impl TunableMeta {
    /// Create metadata
    #[must_use]
    pub fn new(namespace: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            description: description.into(),
            group: None,
            hidden: false,
        }
    }

    /// Set display group
    #[inline]
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Mark as hidden
    #[inline]
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// External key for a field in this namespace
    #[inline]
    #[must_use]
    pub fn key_for(&self, field: &str) -> String {
        format!("{}.{}", self.namespace, field)
    }

    /// Check that namespace and description are present and the namespace
    /// can start an external key
    ///
    /// # Errors
    /// Returns a reason string naming the offending part
    pub fn validate(&self) -> Result<(), String> {
        check_key_part("namespace", &self.namespace)?;
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        Ok(())
    }
}

/// Check one half of an external key
///
/// Keys become command-line options and property names, so they must not
/// start with `-` nor contain `=` or whitespace.
pub(crate) fn check_key_part(what: &str, part: &str) -> Result<(), String> {
    if part.is_empty() {
        return Err(format!("{what} must not be empty"));
    }
    if part.starts_with('-') {
        return Err(format!("{what} '{part}' must not start with '-'"));
    }
    if let Some(bad) = part.chars().find(|&c| c == '=' || c.is_whitespace()) {
        return Err(format!("{what} '{part}' must not contain {bad:?}"));
    }
    Ok(())
}

/// Accessors binding a site to a field of `T`
///
/// One variant per supported [`ValueKind`], plus `Unsupported` for declared
/// fields the framework cannot convert.
pub enum Binding<T> {
    /// Integer field
    Integer {
        /// Read
        get: fn(&T) -> i64,
        /// Write
        set: fn(&mut T, i64),
    },
    /// Float field
    Float {
        /// Read
        get: fn(&T) -> f64,
        /// Write
        set: fn(&mut T, f64),
    },
    /// Boolean field
    Boolean {
        /// Read
        get: fn(&T) -> bool,
        /// Write
        set: fn(&mut T, bool),
    },
    /// Text field
    Text {
        /// Read
        get: fn(&T) -> String,
        /// Write
        set: fn(&mut T, String),
    },
    /// Single-choice field
    Choice {
        /// Borrow the selection
        get: fn(&T) -> &ListSingleSelection,
        /// Borrow the selection mutably
        get_mut: fn(&mut T) -> &mut ListSingleSelection,
    },
    /// Declared type without a conversion
    Unsupported {
        /// Type name shown in diagnostics
        type_name: &'static str,
    },
}

impl<T> Binding<T> {
    /// Value kind, `None` when unsupported
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Integer { .. } => Some(ValueKind::Integer),
            Self::Float { .. } => Some(ValueKind::Float),
            Self::Boolean { .. } => Some(ValueKind::Boolean),
            Self::Text { .. } => Some(ValueKind::Text),
            Self::Choice { .. } => Some(ValueKind::Choice),
            Self::Unsupported { .. } => None,
        }
    }

    /// Type label for diagnostics
    #[must_use]
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Unsupported { type_name } => *type_name,
            other => other.kind().map_or("unknown", ValueKind::as_str),
        }
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Binding<T> {}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.type_label()).finish()
    }
}

/// One declared tunable field
pub struct Site<T> {
    name: String,
    meta: TunableMeta,
    binding: Binding<T>,
}

impl<T> Site<T> {
    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration metadata
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &TunableMeta {
        &self.meta
    }

    /// Field accessors
    #[inline]
    #[must_use]
    pub fn binding(&self) -> Binding<T> {
        self.binding
    }

    /// External key: `namespace.field`
    #[inline]
    #[must_use]
    pub fn key(&self) -> String {
        self.meta.key_for(&self.name)
    }
}

impl<T> Clone for Site<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            meta: self.meta.clone(),
            binding: self.binding,
        }
    }
}

impl<T> fmt::Debug for Site<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .field("binding", &self.binding)
            .finish()
    }
}

/// Declaration list collected from a [`Tunable`]
pub struct Schema<T> {
    sites: Vec<Site<T>>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("sites", &self.sites).finish()
    }
}

impl<T> Schema<T> {
    /// Create empty schema
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { sites: Vec::new() }
    }

    fn push(&mut self, name: &str, meta: TunableMeta, binding: Binding<T>) -> &mut Self {
        self.sites.push(Site {
            name: name.to_string(),
            meta,
            binding,
        });
        self
    }

    /// Declare an integer field
    pub fn integer(
        &mut self,
        name: &str,
        meta: TunableMeta,
        get: fn(&T) -> i64,
        set: fn(&mut T, i64),
    ) -> &mut Self {
        self.push(name, meta, Binding::Integer { get, set })
    }

    /// Declare a float field
    pub fn float(
        &mut self,
        name: &str,
        meta: TunableMeta,
        get: fn(&T) -> f64,
        set: fn(&mut T, f64),
    ) -> &mut Self {
        self.push(name, meta, Binding::Float { get, set })
    }

    /// Declare a boolean field
    pub fn boolean(
        &mut self,
        name: &str,
        meta: TunableMeta,
        get: fn(&T) -> bool,
        set: fn(&mut T, bool),
    ) -> &mut Self {
        self.push(name, meta, Binding::Boolean { get, set })
    }

    /// Declare a text field
    pub fn text(
        &mut self,
        name: &str,
        meta: TunableMeta,
        get: fn(&T) -> String,
        set: fn(&mut T, String),
    ) -> &mut Self {
        self.push(name, meta, Binding::Text { get, set })
    }

    /// Declare a single-choice field
    pub fn choice(
        &mut self,
        name: &str,
        meta: TunableMeta,
        get: fn(&T) -> &ListSingleSelection,
        get_mut: fn(&mut T) -> &mut ListSingleSelection,
    ) -> &mut Self {
        self.push(name, meta, Binding::Choice { get, get_mut })
    }

    /// Declare a field whose type has no conversion
    pub fn unsupported(&mut self, name: &str, meta: TunableMeta, type_name: &'static str) -> &mut Self {
        self.push(name, meta, Binding::Unsupported { type_name })
    }

    /// Declared sites in declaration order
    #[inline]
    #[must_use]
    pub fn sites(&self) -> &[Site<T>] {
        &self.sites
    }

    /// Consume into sites
    #[inline]
    #[must_use]
    pub fn into_sites(self) -> Vec<Site<T>> {
        self.sites
    }

    /// Number of sites
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Check if no sites were declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl<T: Tunable> Schema<T> {
    /// Collect the declarations of `target`
    #[must_use]
    pub fn of(target: &T) -> Self {
        let mut schema = Self::new();
        target.declare(&mut schema);
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sampler {
        count: i64,
        mode: ListSingleSelection,
    }

    impl Tunable for Sampler {
        fn declare(&self, schema: &mut Schema<Self>) {
            schema
                .integer(
                    "count",
                    TunableMeta::new("sampler", "Sample count"),
                    |p| p.count,
                    |p, v| p.count = v,
                )
                .choice(
                    "mode",
                    TunableMeta::new("sampler", "Sampling mode").with_group("Sampling"),
                    |p| &p.mode,
                    |p| &mut p.mode,
                )
                .unsupported("color", TunableMeta::new("sampler", "Marker color"), "Color");
        }
    }

    fn sampler() -> Sampler {
        Sampler {
            count: 3,
            mode: ListSingleSelection::new(["fast", "exact"]).unwrap(),
        }
    }

    #[test]
    fn schema_collects_sites_in_order() {
        let schema = Schema::of(&sampler());
        let names: Vec<_> = schema.sites().iter().map(Site::name).collect();
        assert_eq!(names, vec!["count", "mode", "color"]);
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn site_key_is_namespace_qualified() {
        let schema = Schema::of(&sampler());
        assert_eq!(schema.sites()[0].key(), "sampler.count");
        assert_eq!(schema.sites()[1].meta().group.as_deref(), Some("Sampling"));
    }

    #[test]
    fn binding_kinds() {
        let schema = Schema::of(&sampler());
        let kinds: Vec<_> = schema.sites().iter().map(|s| s.binding().kind()).collect();
        assert_eq!(kinds, vec![Some(ValueKind::Integer), Some(ValueKind::Choice), None]);
        assert_eq!(schema.sites()[2].binding().type_label(), "Color");
    }

    #[test]
    fn binding_accessors_reach_the_field() {
        let mut target = sampler();
        let schema = Schema::of(&target);
        if let Binding::Integer { get, set } = schema.sites()[0].binding() {
            set(&mut target, 9);
            assert_eq!(get(&target), 9);
        } else {
            panic!("expected integer binding");
        }
    }

    #[test]
    fn meta_validation() {
        assert!(TunableMeta::new("layout", "Iterations").validate().is_ok());
        assert!(TunableMeta::new("", "Iterations").validate().is_err());
        assert!(TunableMeta::new("layout", "  ").validate().is_err());
        assert!(TunableMeta::new("-x", "Iterations").validate().is_err());
        assert!(TunableMeta::new("a=b", "Iterations").validate().is_err());
        assert!(TunableMeta::new("my layout", "Iterations").validate().is_err());
        assert!(TunableMeta::new("graph-layout", "Iterations").validate().is_ok());
    }

    #[test]
    fn meta_deserializes_with_defaults() {
        let meta: TunableMeta =
            serde_json::from_str(r#"{"namespace": "layout", "description": "Iterations"}"#).unwrap();
        assert_eq!(meta.group, None);
        assert!(!meta.hidden);
    }
}
