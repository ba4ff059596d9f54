//! Conversion of one TEI document into static DTS artifacts.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use dts_navigation::{Locators, NavigationEntry, NavigationError, NavigationIndex};
use dts_storage::Storage;
use dts_tei::xml::parse_document;
use dts_tei::{
    ArtifactLayout, IdAllocator, PositionalSegmenter, SegmentError, Segmentation,
    StructuralSegmenter,
};

use crate::config::{BuildConfig, SegmentationPolicy};
use crate::error::{BuildError, NavigationStepError};
use crate::report::{BuildReport, NavigationFailure};

/// Converts TEI documents into fragment and navigation artifacts.
///
/// A run segments the source with the configured policy, writes the fragment
/// and full-document artifacts, then derives and writes navigation documents.
/// Segmentation errors abort the run; navigation errors only skip the scope
/// they occur in and are collected in the [`BuildReport`].
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use dts_build::{BuildConfig, DocumentBuilder};
/// use dts_storage::FsStorage;
///
/// let storage = FsStorage::new(PathBuf::from("build"));
/// let builder = DocumentBuilder::new(&storage, BuildConfig::new("ovid"));
/// let report = builder.convert_file(Path::new("ovid.xml"))?;
/// ```
pub struct DocumentBuilder<'a> {
    storage: &'a dyn Storage,
    config: BuildConfig,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder writing through `storage`.
    pub fn new(storage: &'a dyn Storage, config: BuildConfig) -> Self {
        Self { storage, config }
    }

    /// Settings of this builder.
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Convert the file at `path`.
    ///
    /// # Errors
    ///
    /// See [`DocumentBuilder::convert`].
    pub fn convert_file(&self, path: &Path) -> Result<BuildReport, BuildError> {
        self.convert(|| {
            File::open(path)
                .map(BufReader::new)
                .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))
        })
    }

    /// Convert the document produced by `open`.
    ///
    /// `open` is called once per forward pass over the source: once for
    /// structural segmentation, three times for positional segmentation
    /// (facsimile scan, segmentation and raw copy of the full document).
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the document id is invalid, the source cannot
    /// be opened or segmented, or the full document cannot be written.
    pub fn convert<F, R>(&self, open: F) -> Result<BuildReport, BuildError>
    where
        F: Fn() -> io::Result<R>,
        R: BufRead,
    {
        let layout = ArtifactLayout::new(self.config.doc_id.as_str())?;
        let mut ids = IdAllocator::new(self.config.id_prefix.as_str());

        tracing::info!(
            doc_id = layout.doc_id(),
            policy = self.config.policy.name(),
            "Converting document"
        );

        let segmentation = self.segment(&open, &layout, &mut ids)?;

        let mut report = BuildReport {
            doc_id: layout.doc_id().to_owned(),
            fragments: segmentation.fragment_count(),
            warnings: segmentation.warnings.clone(),
            ..Default::default()
        };

        let locators = Locators::new(&self.config.base_url, layout.doc_id());
        match NavigationIndex::new(&segmentation.fragments, locators) {
            Ok(index) => self.write_navigation(&index, &layout, &mut report),
            Err(error) => self.record_failure(&mut report, None, error.into()),
        }

        tracing::info!(
            doc_id = %report.doc_id,
            fragments = report.fragments,
            cite_depth = report.cite_depth,
            navigation = report.navigation_documents,
            warnings = report.warnings.len(),
            failures = report.navigation_failures.len(),
            "Conversion finished"
        );
        Ok(report)
    }

    fn segment<F, R>(
        &self,
        open: &F,
        layout: &ArtifactLayout,
        ids: &mut IdAllocator,
    ) -> Result<Segmentation, BuildError>
    where
        F: Fn() -> io::Result<R>,
        R: BufRead,
    {
        match &self.config.policy {
            SegmentationPolicy::Structural => {
                let mut root = parse_document(open()?).map_err(SegmentError::from)?;
                Ok(StructuralSegmenter::new(self.storage, layout, ids).segment(&mut root)?)
            }
            SegmentationPolicy::Positional { marker } => {
                let segmentation =
                    PositionalSegmenter::new(self.storage, layout, ids, marker.as_str())
                        .segment(open()?, open()?)?;
                let bytes = self
                    .storage
                    .write_from(&layout.document(), &mut open()?)?;
                tracing::debug!(bytes, "Copied full document");
                Ok(segmentation)
            }
        }
    }

    /// Write every navigation scope, recording failures per scope.
    fn write_navigation(
        &self,
        index: &NavigationIndex<'_>,
        layout: &ArtifactLayout,
        report: &mut BuildReport,
    ) {
        report.cite_depth = index.cite_depth();

        self.write_entries(layout, None, Ok(index.document_scope()), report);
        for reference in index.parents() {
            self.write_entries(layout, Some(reference), index.ref_scope(reference), report);
        }
    }

    /// Write one scope's navigation documents.
    ///
    /// Documents written before a failure stay counted.
    fn write_entries(
        &self,
        layout: &ArtifactLayout,
        reference: Option<&str>,
        entries: Result<Vec<NavigationEntry>, NavigationError>,
        report: &mut BuildReport,
    ) {
        let written = entries.map_err(NavigationStepError::from).and_then(|entries| {
            for entry in &entries {
                let json = entry.document.to_json()?;
                let key = layout.navigation(entry.reference.as_deref(), entry.level);
                self.storage.write(&key, json.as_bytes())?;
                report.navigation_documents += 1;
            }
            Ok(())
        });
        if let Err(error) = written {
            self.record_failure(report, reference, error);
        }
    }

    fn record_failure(
        &self,
        report: &mut BuildReport,
        reference: Option<&str>,
        error: NavigationStepError,
    ) {
        let failure = NavigationFailure {
            reference: reference.map(str::to_owned),
            error,
        };
        tracing::error!(doc_id = %self.config.doc_id, "{failure}");
        report.navigation_failures.push(failure);
    }
}
