//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::storage::{Storage, StorageError, StorageErrorKind, validate_key};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Keeps artifacts in memory. Use the builder methods to pre-populate
/// content or to make writes below a key prefix fail.
///
/// # Example
///
/// ```ignore
/// use dts_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new().failing_prefix("doc/navigation/ref/");
/// storage.write("doc/document.xml", b"<TEI/>").unwrap();
/// assert!(storage.write("doc/navigation/ref/a/toplevel.json", b"{}").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    contents: RwLock<BTreeMap<String, Vec<u8>>>,
    failing_prefixes: Vec<String>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add content for a key.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_content(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.contents
            .write()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Make every write to a key starting with `prefix` fail.
    #[must_use]
    pub fn failing_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.failing_prefixes.push(prefix.into());
        self
    }

    /// Read an artifact as UTF-8 text.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn text(&self, path: &str) -> Option<String> {
        self.contents
            .read()
            .unwrap()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Number of stored artifacts.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.read().unwrap().len()
    }

    /// Whether no artifact has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MockStorage {
    fn write(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        validate_key(path).map_err(|e| e.with_backend(BACKEND))?;

        if self
            .failing_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return Err(StorageError::new(StorageErrorKind::Unavailable)
                .with_path(path)
                .with_backend(BACKEND));
        }

        self.contents
            .write()
            .unwrap()
            .insert(path.to_owned(), content.to_vec());
        Ok(())
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.contents
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        self.contents.read().unwrap().contains_key(path)
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.contents.read().unwrap().keys().cloned().collect())
    }
}
