//! Artifact storage for dtsflat.
//!
//! This crate provides a [`Storage`] trait that persists generated artifacts
//! (document fragments, navigation indexes) under logical path keys. Producers
//! only build keys such as `"doc/navigation/level/1.json"`; the backend decides
//! where the bytes physically go.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `write()`, `read()`, `exists()` and `list()` methods
//! - [`FsStorage`] implementation rooted at an output directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use dts_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("build"));
//! storage.write("doc/document.xml", b"<TEI/>")?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
