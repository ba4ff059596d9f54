//! Error types for the conversion pipeline.

use dts_navigation::NavigationError;
use dts_storage::StorageError;
use dts_tei::{InvalidDocumentId, SegmentError};

/// Fatal error of a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Document id cannot be used in artifact paths.
    #[error(transparent)]
    DocumentId(#[from] InvalidDocumentId),

    /// Source could not be opened.
    #[error("failed to open source: {0}")]
    Io(#[from] std::io::Error),

    /// Segmentation failed.
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// Full document artifact could not be written.
    #[error("failed to write full document: {0}")]
    Storage(#[from] StorageError),
}

/// Error of one navigation generation step.
#[derive(Debug, thiserror::Error)]
pub enum NavigationStepError {
    /// Navigation documents could not be computed.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Navigation artifact could not be written.
    #[error("failed to write navigation: {0}")]
    Storage(#[from] StorageError),
}
