//! Conversion pipeline for dtsflat.
//!
//! Ties segmentation, navigation and storage together: a [`DocumentBuilder`]
//! reads one TEI source and writes the complete static artifact tree for it.
//!
//! ```text
//! {doc}/document.xml
//! {doc}/document/{ref}.xml
//! {doc}/navigation/toplevel.json
//! {doc}/navigation/level/{L}.json
//! {doc}/navigation/ref/{ref}/toplevel.json
//! {doc}/navigation/ref/{ref}/level/{L}.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use dts_build::{BuildConfig, DocumentBuilder, SegmentationPolicy};
//! use dts_storage::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("build"));
//! let config = BuildConfig::new("ovid").with_policy(SegmentationPolicy::page_breaks());
//! let report = DocumentBuilder::new(&storage, config).convert_file(Path::new("ovid.xml"))?;
//! assert!(report.is_complete());
//! ```

mod builder;
mod config;
mod error;
mod report;

pub use builder::DocumentBuilder;
pub use config::{BuildConfig, SegmentationPolicy};
pub use error::{BuildError, NavigationStepError};
pub use report::{BuildReport, NavigationFailure};
