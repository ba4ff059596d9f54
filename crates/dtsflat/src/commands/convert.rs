//! `dtsflat convert` command implementation.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use dts_build::{BuildConfig, DocumentBuilder};
use dts_config::{CliSettings, Config, SplitMode};
use dts_storage::FsStorage;

use crate::error::CliError;
use crate::output::Output;

/// Segmentation mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// One fragment per `div`, nested like the source.
    Structural,
    /// One flat fragment per marker element.
    Positional,
}

impl From<ModeArg> for SplitMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Structural => Self::Structural,
            ModeArg::Positional => Self::Positional,
        }
    }
}

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// TEI source document.
    input: PathBuf,

    /// Document id used as the first segment of every artifact (default: input file stem).
    #[arg(long)]
    doc_id: Option<String>,

    /// Segmentation mode (overrides config).
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Marker element for positional mode (overrides config).
    #[arg(long)]
    marker: Option<String>,

    /// Output directory for generated artifacts (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base URL of the API locators written into navigation (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Prefix of generated fragment ids (overrides config).
    #[arg(long)]
    id_prefix: Option<String>,

    /// Path to configuration file (default: auto-discover dtsflat.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ConvertArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let doc_id = match self.doc_id.clone() {
            Some(doc_id) => doc_id,
            None => default_doc_id(&self.input)?,
        };

        let cli_settings = CliSettings {
            output_dir: self.output_dir.clone(),
            base_url: self.base_url.clone(),
            id_prefix: self.id_prefix.clone(),
            mode: self.mode.map(SplitMode::from),
            marker: self.marker.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let output_dir = config.output_resolved.dir.clone();
        output.field("Source", self.input.display());
        output.field("Output", output_dir.display());

        let storage = FsStorage::new(output_dir.clone());
        let build_config = BuildConfig::from_config(&config, doc_id);
        let report = DocumentBuilder::new(&storage, build_config).convert_file(&self.input)?;

        output.report(&report);

        if !report.is_complete() {
            return Err(CliError::Incomplete {
                doc_id: report.doc_id,
                count: report.navigation_failures.len(),
            });
        }

        output.success(&format!(
            "Converted '{}' to {}",
            report.doc_id,
            output_dir.display()
        ));
        Ok(())
    }
}

/// Document id derived from the input file name.
fn default_doc_id(input: &Path) -> Result<String, CliError> {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            CliError::Validation(format!(
                "cannot derive a document id from {}, use --doc-id",
                input.display()
            ))
        })
}
