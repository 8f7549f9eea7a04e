//! Source and sink traits for external representations
//!
//! Loading reads from a [`TunableSource`]; storing writes to a
//! [`TunableSink`]. Both speak `namespace.field` keys and string values.

use crate::declaration::TunableMeta;
use crate::error::BackendError;
use std::collections::{BTreeMap, HashMap};

/// External representation that values are loaded from
pub trait TunableSource {
    /// Value for `key`, `None` when the key is absent
    fn lookup(&self, key: &str) -> Option<String>;
}

/// One value on its way to a sink
#[derive(Debug, Clone, Copy)]
pub struct FieldRecord<'a> {
    /// External key
    pub key: &'a str,
    /// External text
    pub value: &'a str,
    /// Declaration metadata of the field
    pub meta: &'a TunableMeta,
}

/// External representation that values are stored into
pub trait TunableSink {
    /// Accept one value
    ///
    /// # Errors
    /// Returns an error if this single value is refused; the batch goes on
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError>;

    /// Persist everything recorded since the last commit
    ///
    /// Called exactly once per store batch.
    ///
    /// # Errors
    /// Returns an error if persisting fails; the batch fails as a whole
    fn commit(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

impl<S: TunableSource + ?Sized> TunableSource for &S {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

impl<S: TunableSink + ?Sized> TunableSink for &mut S {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        (**self).record(record)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        (**self).commit()
    }
}

impl<S: std::hash::BuildHasher> TunableSource for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<S: std::hash::BuildHasher> TunableSink for HashMap<String, String, S> {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        self.insert(record.key.to_string(), record.value.to_string());
        Ok(())
    }
}

impl TunableSource for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl TunableSink for BTreeMap<String, String> {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        self.insert(record.key.to_string(), record.value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_round_trip() {
        let meta = TunableMeta::new("layout", "Iterations");
        let mut map: HashMap<String, String> = HashMap::new();
        map.record(FieldRecord {
            key: "layout.iterations",
            value: "10",
            meta: &meta,
        })
        .unwrap();
        map.commit().unwrap();

        assert_eq!(map.lookup("layout.iterations").as_deref(), Some("10"));
        assert_eq!(map.lookup("layout.missing"), None);
    }

    #[test]
    fn references_forward() {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        map.insert("a.b".to_string(), "1".to_string());
        let source = &map;
        assert_eq!(TunableSource::lookup(&source, "a.b").as_deref(), Some("1"));
    }
}
