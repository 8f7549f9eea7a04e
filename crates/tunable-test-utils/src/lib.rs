//! Testing utilities for the tunable workspace
//!
//! Shared fixtures, sinks, and helpers.

#![allow(missing_docs)]

use std::collections::HashMap;
use tunable_core::{
    shared, BackendError, FieldRecord, ListSingleSelection, Schema, Shared, Tunable, TunableMeta,
    TunableSink,
};

pub const LAYOUT_ALGORITHMS: [&str; 3] = ["force-directed", "circular", "hierarchical"];

/// Layout parameters covering every value kind plus one unsupported field
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    pub iterations: i64,
    pub spring_length: f64,
    pub randomize: bool,
    pub label: String,
    pub algorithm: ListSingleSelection,
    pub edge_color: (u8, u8, u8),
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            iterations: 100,
            spring_length: 42.5,
            randomize: false,
            label: "default layout".to_string(),
            algorithm: ListSingleSelection::new(LAYOUT_ALGORITHMS)
                .and_then(|s| s.with_selected("force-directed"))
                .unwrap(),
            edge_color: (0, 0, 0),
        }
    }
}

impl Tunable for LayoutSettings {
    fn declare(&self, schema: &mut Schema<Self>) {
        schema
            .integer(
                "iterations",
                TunableMeta::new("layout", "Number of iterations").with_group("Algorithm"),
                |s| s.iterations,
                |s, v| s.iterations = v,
            )
            .float(
                "springLength",
                TunableMeta::new("layout", "Spring rest length").with_group("Algorithm"),
                |s| s.spring_length,
                |s, v| s.spring_length = v,
            )
            .boolean(
                "randomize",
                TunableMeta::new("layout", "Randomize initial positions"),
                |s| s.randomize,
                |s, v| s.randomize = v,
            )
            .text(
                "label",
                TunableMeta::new("layout", "Display label"),
                |s| s.label.clone(),
                |s, v| s.label = v,
            )
            .choice(
                "algorithm",
                TunableMeta::new("layout", "Layout algorithm"),
                |s| &s.algorithm,
                |s| &mut s.algorithm,
            )
            .unsupported(
                "edgeColor",
                TunableMeta::new("layout", "Edge color"),
                "Color",
            );
    }
}

/// Keys the standard factory binds for [`LayoutSettings`]
pub const LAYOUT_KEYS: [&str; 5] = [
    "layout.iterations",
    "layout.springLength",
    "layout.randomize",
    "layout.label",
    "layout.algorithm",
];

/// Export parameters in a second namespace, including a hidden field
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub format: ListSingleSelection,
    pub dpi: i64,
    pub path: String,
    pub session_token: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ListSingleSelection::new(["png", "svg", "pdf"])
                .and_then(|s| s.with_selected("png"))
                .unwrap(),
            dpi: 300,
            path: "network.png".to_string(),
            session_token: "none".to_string(),
        }
    }
}

impl Tunable for ExportSettings {
    fn declare(&self, schema: &mut Schema<Self>) {
        schema
            .choice(
                "format",
                TunableMeta::new("export", "Image format"),
                |s| &s.format,
                |s| &mut s.format,
            )
            .integer(
                "dpi",
                TunableMeta::new("export", "Resolution in dots per inch"),
                |s| s.dpi,
                |s, v| s.dpi = v,
            )
            .text(
                "path",
                TunableMeta::new("export", "Output file"),
                |s| s.path.clone(),
                |s, v| s.path = v,
            )
            .text(
                "sessionToken",
                TunableMeta::new("export", "Session token").hidden(),
                |s| s.session_token.clone(),
                |s, v| s.session_token = v,
            );
    }
}

/// Declares an extra site once `extended` is set, for re-scan tests
#[derive(Debug, Default)]
pub struct GrowingSettings {
    pub base: i64,
    pub extra: i64,
    pub extended: bool,
}

impl Tunable for GrowingSettings {
    fn declare(&self, schema: &mut Schema<Self>) {
        schema.integer(
            "base",
            TunableMeta::new("grow", "Always declared"),
            |s| s.base,
            |s, v| s.base = v,
        );
        if self.extended {
            schema.integer(
                "extra",
                TunableMeta::new("grow", "Declared after extension"),
                |s| s.extra,
                |s, v| s.extra = v,
            );
        }
    }
}

/// Declares the same key twice
#[derive(Debug, Default)]
pub struct DuplicateKeys {
    pub value: i64,
}

impl Tunable for DuplicateKeys {
    fn declare(&self, schema: &mut Schema<Self>) {
        for _ in 0..2 {
            schema.integer(
                "value",
                TunableMeta::new("dup", "Declared twice"),
                |s| s.value,
                |s, v| s.value = v,
            );
        }
    }
}

/// Declares a field with an empty description
#[derive(Debug, Default)]
pub struct MissingDescription {
    pub value: i64,
}

impl Tunable for MissingDescription {
    fn declare(&self, schema: &mut Schema<Self>) {
        schema.integer(
            "value",
            TunableMeta::new("broken", ""),
            |s| s.value,
            |s, v| s.value = v,
        );
    }
}

pub fn layout_settings() -> Shared<LayoutSettings> {
    shared(LayoutSettings::default())
}

pub fn export_settings() -> Shared<ExportSettings> {
    shared(ExportSettings::default())
}

/// Sink that records values, counts commits, and refuses chosen keys
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub values: HashMap<String, String>,
    pub descriptions: HashMap<String, String>,
    pub commits: usize,
    pub refuse: Vec<String>,
    pub fail_commit: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing(keys: &[&str]) -> Self {
        Self {
            refuse: keys.iter().map(|k| (*k).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl TunableSink for RecordingSink {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        if self.refuse.iter().any(|k| k == record.key) {
            return Err(BackendError::Rejected {
                key: record.key.to_string(),
                reason: "refused by test sink".to_string(),
            });
        }
        self.values
            .insert(record.key.to_string(), record.value.to_string());
        self.descriptions
            .insert(record.key.to_string(), record.meta.description.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        if self.fail_commit {
            return Err(BackendError::Format("commit refused by test sink".to_string()));
        }
        self.commits += 1;
        Ok(())
    }
}

pub fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
