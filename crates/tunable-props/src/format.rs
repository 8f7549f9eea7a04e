//! Property file formats, selected by file extension

use crate::error::{PropsError, PropsResult};
use crate::properties;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// On-disk representation of a flat string map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyFormat {
    /// Java-style `key=value` lines
    #[default]
    Properties,
    /// Flat JSON object
    Json,
    /// Flat YAML mapping
    Yaml,
}

impl PropertyFormat {
    /// All formats
    pub const ALL: [Self; 3] = [Self::Properties, Self::Json, Self::Yaml];

    /// Pick a format from a path's extension
    ///
    /// Unknown or missing extensions fall back to [`PropertyFormat::Properties`].
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| {
                Self::ALL
                    .into_iter()
                    .find(|f| f.extensions().iter().any(|x| x.eq_ignore_ascii_case(ext)))
            })
            .unwrap_or_default()
    }

    /// Supported file extensions (without dot)
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Properties => &["properties"],
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    /// Parse text into a flat map
    ///
    /// Whitespace-only text is an empty map in every format. In JSON and
    /// YAML, numbers and booleans are read as their text and nulls are
    /// skipped.
    ///
    /// # Errors
    /// - [`PropsError::Syntax`], [`PropsError::Json`] or [`PropsError::Yaml`]
    ///   for malformed text
    /// - [`PropsError::Format`] for a non-object root or nested values
    pub fn parse(self, text: &str) -> PropsResult<BTreeMap<String, String>> {
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match self {
            Self::Properties => properties::parse(text),
            Self::Json => parse_json(text),
            Self::Yaml => parse_yaml(text),
        }
    }

    /// Render a flat map
    ///
    /// Only the properties format can carry `comments`.
    ///
    /// # Errors
    /// Returns [`PropsError::Json`] or [`PropsError::Yaml`] if serialization fails
    pub fn render(
        self,
        entries: &BTreeMap<String, String>,
        comments: &BTreeMap<String, String>,
    ) -> PropsResult<String> {
        match self {
            Self::Properties => Ok(properties::render(entries, comments)),
            Self::Json => {
                let mut text = serde_json::to_string_pretty(entries)?;
                text.push('\n');
                Ok(text)
            }
            Self::Yaml => Ok(serde_yaml::to_string(entries)?),
        }
    }
}

impl fmt::Display for PropertyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extensions()[0])
    }
}

fn parse_json(text: &str) -> PropsResult<BTreeMap<String, String>> {
    use serde_json::Value;

    let Value::Object(object) = serde_json::from_str::<Value>(text)? else {
        return Err(PropsError::Format("JSON root must be an object".to_string()));
    };

    let mut entries = BTreeMap::new();
    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(PropsError::Format(format!("nested value for key '{key}'")));
            }
        };
        entries.insert(key, text);
    }
    Ok(entries)
}

fn parse_yaml(text: &str) -> PropsResult<BTreeMap<String, String>> {
    use serde_yaml::Value;

    let mapping = match serde_yaml::from_str::<Value>(text)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(BTreeMap::new()),
        _ => return Err(PropsError::Format("YAML root must be a mapping".to_string())),
    };

    let mut entries = BTreeMap::new();
    for (key, value) in mapping {
        let key = yaml_scalar(key)
            .flatten()
            .ok_or_else(|| PropsError::Format("YAML keys must be scalars".to_string()))?;
        match yaml_scalar(value) {
            Some(Some(text)) => {
                entries.insert(key, text);
            }
            Some(None) => {}
            None => return Err(PropsError::Format(format!("nested value for key '{key}'"))),
        }
    }
    Ok(entries)
}

/// `None` for non-scalars, `Some(None)` for null
fn yaml_scalar(value: serde_yaml::Value) -> Option<Option<String>> {
    use serde_yaml::Value;

    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s)),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}
