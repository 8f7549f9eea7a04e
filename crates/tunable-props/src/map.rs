//! In-memory property map

use crate::error::PropsResult;
use crate::format::PropertyFormat;
use std::collections::btree_map::{self, BTreeMap};
use tunable_core::{BackendError, FieldRecord, TunableSink, TunableSource};

/// Ordered string-keyed map of property values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse text in the given format
    ///
    /// # Errors
    /// Propagates the format's parse errors
    pub fn parse(text: &str, format: PropertyFormat) -> PropsResult<Self> {
        format.parse(text).map(Self::from)
    }

    /// Render in the given format, without comments
    ///
    /// # Errors
    /// Propagates the format's serialization errors
    pub fn render(&self, format: PropertyFormat) -> PropsResult<String> {
        format.render(&self.entries, &BTreeMap::new())
    }

    /// Get a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Check if key is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Keys under a namespace, e.g. `"layout"` for `layout.*`
    pub fn namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.entries.iter().filter_map(move |(k, v)| {
            k.strip_prefix(namespace)
                .filter(|rest| rest.starts_with('.'))
                .map(|_| (k.as_str(), v.as_str()))
        })
    }

    /// Copy every entry of `other` over this map
    pub fn merge(&mut self, other: &PropertyMap) {
        self.entries
            .extend(other.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Borrow the underlying map
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Take the underlying map
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl From<BTreeMap<String, String>> for PropertyMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl TunableSource for PropertyMap {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

impl TunableSink for PropertyMap {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        self.entries
            .insert(record.key.to_string(), record.value.to_string());
        Ok(())
    }
}
