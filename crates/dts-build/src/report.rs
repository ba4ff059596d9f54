//! Outcome of a conversion run.

use dts_tei::Warning;

use crate::error::NavigationStepError;

/// Navigation scope that could not be generated.
#[derive(Debug)]
pub struct NavigationFailure {
    /// Anchor fragment, `None` for the document scope.
    pub reference: Option<String>,
    /// What went wrong.
    pub error: NavigationStepError,
}

impl std::fmt::Display for NavigationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reference {
            Some(reference) => write!(f, "navigation for '{reference}': {}", self.error),
            None => write!(f, "document navigation: {}", self.error),
        }
    }
}

/// Summary of a completed conversion run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Document id.
    pub doc_id: String,
    /// Number of fragment artifacts written.
    pub fragments: usize,
    /// Deepest fragment level.
    pub cite_depth: u32,
    /// Number of navigation artifacts written.
    pub navigation_documents: usize,
    /// Recoverable problems from segmentation.
    pub warnings: Vec<Warning>,
    /// Navigation scopes that failed; everything else was written.
    pub navigation_failures: Vec<NavigationFailure>,
}

impl BuildReport {
    /// Whether every artifact was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.navigation_failures.is_empty()
    }
}
