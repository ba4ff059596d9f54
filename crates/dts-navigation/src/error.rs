//! Navigation error types.

/// Failure of one navigation generation step.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NavigationError {
    /// Navigation requested for a fragment id that is not in the hierarchy.
    #[error("reference '{0}' not found in fragment hierarchy")]
    ReferenceNotFound(String),

    /// Two fragments share the same id.
    #[error("duplicate fragment id '{0}'")]
    DuplicateReference(String),

    /// Navigation document could not be serialized.
    #[error("failed to serialize navigation document: {0}")]
    Json(#[from] serde_json::Error),
}
