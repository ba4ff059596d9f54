//! CLI error types.

use dts_build::BuildError;
use dts_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Validation(String),

    #[error("{count} navigation scope(s) failed for '{doc_id}'")]
    Incomplete { doc_id: String, count: usize },
}
