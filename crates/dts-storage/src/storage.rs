//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for persisting generated artifacts,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Path Key Convention
//!
//! All path parameters are **logical keys**, not file paths:
//! - `"doc/document.xml"` - full document artifact
//! - `"doc/document/sec1.xml"` - one fragment
//! - `"doc/navigation/level/1.json"` - one navigation index
//!
//! Keys always use `/` as separator. Backends map keys to their own layout.

use std::io::Read;

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Artifact does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path key (empty, absolute, or escaping the root).
    InvalidPath,
    /// Backend is unavailable (e.g., output directory cannot be created).
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    path: Option<String>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path key context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Path key the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::InvalidPath).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        Self::new(kind).with_source(err).with_path(path)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: doc/document.xml)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Check that a path key is relative, non-empty and free of `..`/`.` segments.
pub(crate) fn validate_key(path: &str) -> Result<(), StorageError> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(StorageError::invalid_path(path))
    }
}

/// Storage abstraction for generated artifacts.
///
/// A conversion run writes every artifact through this trait, so the same
/// pipeline can target the filesystem or an in-memory store in tests.
pub trait Storage: Send + Sync {
    /// Persist `content` under `path`, replacing any previous artifact.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the key is invalid or the backend fails.
    fn write(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Persist everything `reader` yields under `path`.
    ///
    /// Returns the number of bytes written. The default implementation
    /// buffers the input and delegates to [`Storage::write`]; backends that
    /// can stream should override it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if reading the input or writing fails.
    fn write_from(&self, path: &str, reader: &mut dyn Read) -> Result<u64, StorageError> {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| StorageError::io(e, path))?;
        self.write(path, &content)?;
        Ok(content.len() as u64)
    }

    /// Read an artifact back.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the artifact doesn't exist or can't be read.
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Check if an artifact exists at the given key.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, path: &str) -> bool;

    /// List all artifact keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be enumerated.
    fn list(&self) -> Result<Vec<String>, StorageError>;
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_validate_key_accepts_nested_keys() {
        assert!(validate_key("doc/navigation/ref/sec1/level/2.json").is_ok());
        assert!(validate_key("doc/document.xml").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        let err = validate_key("doc/../../etc/passwd").unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidPath);
        assert_eq!(err.path(), Some("doc/../../etc/passwd"));
    }

    #[test]
    fn test_validate_key_rejects_absolute_and_empty() {
        assert!(validate_key("").is_err());
        assert!(validate_key("/abs/path").is_err());
        assert!(validate_key("doc//double").is_err());
        assert!(validate_key("doc/./x").is_err());
        assert!(validate_key("doc\\x").is_err());
    }

    struct VecStorage(std::sync::Mutex<Vec<(String, Vec<u8>)>>);

    impl Storage for VecStorage {
        fn write(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
            self.0
                .lock()
                .unwrap()
                .push((path.to_owned(), content.to_vec()));
            Ok(())
        }

        fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::not_found(path))
        }

        fn exists(&self, _path: &str) -> bool {
            false
        }

        fn list(&self) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_default_write_from_delegates_to_write() {
        let storage = VecStorage(std::sync::Mutex::new(Vec::new()));
        let mut input: &[u8] = b"<TEI/>";

        let written = storage.write_from("doc/document.xml", &mut input).unwrap();

        assert_eq!(written, 6);
        let writes = storage.0.lock().unwrap();
        assert_eq!(writes[0], ("doc/document.xml".to_owned(), b"<TEI/>".to_vec()));
    }

    #[test]
    fn test_error_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = StorageError::io(io_err, "doc/document.xml").with_backend("Fs");

        assert_eq!(
            err.to_string(),
            "[Fs] Not found: file missing (path: doc/document.xml)"
        );
    }

    #[test]
    fn test_error_display_minimal() {
        let err = StorageError::new(StorageErrorKind::Unavailable);
        assert_eq!(err.to_string(), "Unavailable");
    }

    #[test]
    fn test_io_error_kind_mapping() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(
            StorageError::io(denied, "x").kind(),
            StorageErrorKind::PermissionDenied
        );

        let other = std::io::Error::other("boom");
        assert_eq!(StorageError::io(other, "x").kind(), StorageErrorKind::Other);
    }

    #[test]
    fn test_error_source_chain() {
        let io_err = std::io::Error::other("disk full");
        let err = StorageError::io(io_err, "doc/a.xml");

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "disk full");
    }
}
