//! File-backed property store
//!
//! Values recorded during a store batch are buffered in memory and written
//! in one go on `commit`.

use crate::error::{PropsError, PropsResult};
use crate::format::PropertyFormat;
use crate::map::PropertyMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tunable_core::{BackendError, FieldRecord, TunableSink, TunableSource};

/// Property file on disk
#[derive(Debug, Clone)]
pub struct PropertyFile {
    path: PathBuf,
    format: PropertyFormat,
    entries: PropertyMap,
    comments: BTreeMap<String, String>,
    dirty: bool,
}

impl PropertyFile {
    /// Open a property file, reading it if it exists
    ///
    /// A missing file is an empty map; it is created on the first save.
    ///
    /// # Errors
    /// - [`PropsError::Io`] if the file exists but cannot be read
    /// - a parse error if its content is malformed
    pub fn open(path: impl Into<PathBuf>) -> PropsResult<Self> {
        let path = path.into();
        let format = PropertyFormat::from_path(&path);
        let entries = match fs::read_to_string(&path) {
            Ok(text) => PropertyMap::parse(&text, format)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "property file not found, starting empty");
                PropertyMap::new()
            }
            Err(e) => return Err(PropsError::io_error(&path, e)),
        };
        tracing::debug!(path = %path.display(), %format, entries = entries.len(), "opened property file");
        Ok(Self {
            path,
            format,
            entries,
            comments: BTreeMap::new(),
            dirty: false,
        })
    }

    /// Start an empty property file without reading `path`
    #[must_use]
    pub fn create(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            format: PropertyFormat::from_path(&path),
            path,
            entries: PropertyMap::new(),
            comments: BTreeMap::new(),
            dirty: true,
        }
    }

    /// Override the extension-derived format
    #[must_use]
    pub fn with_format(mut self, format: PropertyFormat) -> Self {
        self.format = format;
        self
    }

    /// File path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File format
    #[inline]
    #[must_use]
    pub fn format(&self) -> PropertyFormat {
        self.format
    }

    /// Current entries, including unsaved ones
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &PropertyMap {
        &self.entries
    }

    /// Get a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key)
    }

    /// Set a value in memory
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key, value);
        self.dirty = true;
    }

    /// Check for changes not yet saved
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write every entry to disk, creating parent directories
    ///
    /// # Errors
    /// - [`PropsError::Io`] if the file cannot be written
    /// - a serialization error from the format
    pub fn save(&mut self) -> PropsResult<()> {
        let text = self.format.render(self.entries.as_map(), &self.comments)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PropsError::io_error(parent, e))?;
        }
        fs::write(&self.path, text).map_err(|e| PropsError::io_error(&self.path, e))?;
        self.dirty = false;
        tracing::info!(path = %self.path.display(), entries = self.entries.len(), "saved property file");
        Ok(())
    }

    /// Re-read the file, discarding unsaved changes
    ///
    /// # Errors
    /// Same as [`PropertyFile::open`]
    pub fn reload(&mut self) -> PropsResult<()> {
        let fresh = Self::open(&self.path)?.with_format(self.format);
        self.entries = fresh.entries;
        self.dirty = false;
        Ok(())
    }
}

impl TunableSource for PropertyFile {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.lookup(key)
    }
}

impl TunableSink for PropertyFile {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        self.comments
            .insert(record.key.to_string(), record.meta.description.clone());
        self.set(record.key, record.value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.save().map_err(BackendError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let file = PropertyFile::open(dir.path().join("absent.properties")).unwrap();
        assert!(file.entries().is_empty());
        assert!(!file.is_dirty());
        assert!(!file.path().exists());
    }

    #[test]
    fn save_creates_parents_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/settings.json");

        let mut file = PropertyFile::create(&path);
        assert_eq!(file.format(), PropertyFormat::Json);
        file.set("layout.iterations", "12");
        file.save().unwrap();
        assert!(!file.is_dirty());

        let reopened = PropertyFile::open(&path).unwrap();
        assert_eq!(reopened.get("layout.iterations"), Some("12"));
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.properties");
        fs::write(&path, "a=1\n").unwrap();

        let mut file = PropertyFile::open(&path).unwrap();
        file.set("a", "2");
        assert!(file.is_dirty());
        file.reload().unwrap();
        assert_eq!(file.get("a"), Some("1"));
    }

    #[test]
    fn malformed_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(PropertyFile::open(&path), Err(PropsError::Json(_))));
    }

    #[test]
    fn with_format_overrides_extension() {
        let file = PropertyFile::create("settings.txt").with_format(PropertyFormat::Yaml);
        assert_eq!(file.format(), PropertyFormat::Yaml);
    }
}
