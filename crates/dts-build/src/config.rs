//! Per-run build settings.

use dts_config::{Config, SplitMode};
use dts_navigation::DEFAULT_BASE_URL;
use dts_tei::{DEFAULT_ID_PREFIX, DEFAULT_MARKER};

/// How the source is cut into fragments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SegmentationPolicy {
    /// One fragment per `div`, nested like the source.
    #[default]
    Structural,
    /// One flat fragment per marker element.
    Positional {
        /// Local name of the marker element.
        marker: String,
    },
}

impl SegmentationPolicy {
    /// Positional policy cutting at page breaks.
    #[must_use]
    pub fn page_breaks() -> Self {
        Self::Positional {
            marker: DEFAULT_MARKER.to_owned(),
        }
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Positional { .. } => "positional",
        }
    }
}

/// Settings of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Document id, first segment of every artifact key.
    pub doc_id: String,
    /// Base of the API locators written into navigation documents.
    pub base_url: String,
    /// Prefix of allocated fragment ids.
    pub id_prefix: String,
    /// Segmentation policy.
    pub policy: SegmentationPolicy,
}

impl BuildConfig {
    /// Settings with defaults for everything but the document id.
    #[must_use]
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            id_prefix: DEFAULT_ID_PREFIX.to_owned(),
            policy: SegmentationPolicy::Structural,
        }
    }

    /// Settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config, doc_id: impl Into<String>) -> Self {
        let policy = match config.split.mode {
            SplitMode::Structural => SegmentationPolicy::Structural,
            SplitMode::Positional => SegmentationPolicy::Positional {
                marker: config.split.marker.clone(),
            },
        };
        Self {
            doc_id: doc_id.into(),
            base_url: config.base_url().to_owned(),
            id_prefix: config.ids.prefix.clone(),
            policy,
        }
    }

    /// Builder: set segmentation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SegmentationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: set locator base.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder: set id prefix.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }
}
