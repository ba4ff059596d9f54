//! Artifact path keys.
//!
//! Every artifact of a document lives below the document id:
//!
//! ```text
//! {doc}/document.xml
//! {doc}/document/{ref}.xml
//! {doc}/navigation/toplevel.json
//! {doc}/navigation/level/{L}.json
//! {doc}/navigation/ref/{ref}/toplevel.json
//! {doc}/navigation/ref/{ref}/level/{L}.json
//! ```

/// Document id that cannot be used as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid document id '{0}': must be a non-empty name without '/' or '\\'")]
pub struct InvalidDocumentId(pub String);

/// Path keys of one document's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    doc_id: String,
}

impl ArtifactLayout {
    /// Create the layout for `doc_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDocumentId`] if the id is empty, `.`/`..`, or contains
    /// a path separator.
    pub fn new(doc_id: impl Into<String>) -> Result<Self, InvalidDocumentId> {
        let doc_id = doc_id.into();
        if doc_id.is_empty() || doc_id == "." || doc_id == ".." || doc_id.contains(['/', '\\']) {
            return Err(InvalidDocumentId(doc_id));
        }
        Ok(Self { doc_id })
    }

    /// Document id.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Key of the full document artifact.
    #[must_use]
    pub fn document(&self) -> String {
        format!("{}/document.xml", self.doc_id)
    }

    /// Key of one fragment artifact.
    #[must_use]
    pub fn fragment(&self, reference: &str) -> String {
        format!("{}/document/{reference}.xml", self.doc_id)
    }

    /// Key of a navigation artifact.
    ///
    /// `level: None` addresses the `toplevel` alias of the scope.
    #[must_use]
    pub fn navigation(&self, reference: Option<&str>, level: Option<u32>) -> String {
        let scope = match reference {
            Some(reference) => format!("{}/navigation/ref/{reference}", self.doc_id),
            None => format!("{}/navigation", self.doc_id),
        };
        match level {
            Some(level) => format!("{scope}/level/{level}.json"),
            None => format!("{scope}/toplevel.json"),
        }
    }
}
