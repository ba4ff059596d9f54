//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for writing artifacts below an output directory.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind, validate_key};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Maps each path key onto a file below `root`, creating intermediate
/// directories on write.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use dts_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("build"));
/// storage.write("doc/navigation/toplevel.json", b"{}")?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    /// Root directory for artifacts.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a validated key to a filesystem path.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_key(path).map_err(|e| e.with_backend(BACKEND))?;
        Ok(path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg)))
    }

    /// Collect keys of all files below `dir`, relative to the root.
    fn collect_keys(
        &self,
        dir: &Path,
        prefix: &str,
        keys: &mut Vec<String>,
    ) -> Result<(), StorageError> {
        let entries =
            fs::read_dir(dir).map_err(|e| StorageError::io(e, prefix).with_backend(BACKEND))?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(e, prefix).with_backend(BACKEND))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };

            let file_type = entry
                .file_type()
                .map_err(|e| StorageError::io(e, key.as_str()).with_backend(BACKEND))?;
            if file_type.is_dir() {
                self.collect_keys(&entry.path(), &key, keys)?;
            } else if file_type.is_file() {
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl Storage for FsStorage {
    fn write(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable)
                    .with_source(e)
                    .with_path(path)
                    .with_backend(BACKEND)
            })?;
        }

        fs::write(&full_path, content)
            .map_err(|e| StorageError::io(e, path).with_backend(BACKEND))?;
        tracing::trace!(path, bytes = content.len(), "Wrote artifact");
        Ok(())
    }

    fn write_from(&self, path: &str, reader: &mut dyn Read) -> Result<u64, StorageError> {
        let full_path = self.resolve(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable)
                    .with_source(e)
                    .with_path(path)
                    .with_backend(BACKEND)
            })?;
        }

        let mut file = fs::File::create(&full_path)
            .map_err(|e| StorageError::io(e, path).with_backend(BACKEND))?;
        let bytes = io::copy(reader, &mut file)
            .map_err(|e| StorageError::io(e, path).with_backend(BACKEND))?;
        tracing::trace!(path, bytes, "Streamed artifact");
        Ok(bytes)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path).map_err(|e| StorageError::io(e, path).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        if !self.root.exists() {
            return Ok(keys);
        }
        self.collect_keys(&self.root, "", &mut keys)?;
        keys.sort();
        Ok(keys)
    }
}
