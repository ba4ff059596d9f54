//! Navigation document shape.

use serde::Serialize;

use crate::error::NavigationError;

/// JSON-LD context shared by every navigation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Context {
    #[serde(rename = "@vocab")]
    vocab: &'static str,
    dc: &'static str,
    dts: &'static str,
}

/// The fixed navigation context.
pub const CONTEXT: Context = Context {
    vocab: "https://www.w3.org/ns/hydra/core#",
    dc: "http://purl.org/dc/terms/",
    dts: "https://w3id.org/dts/api#",
};

/// Member entry (`{"ref": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Fragment id.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Member {
    /// Create a member entry.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

/// Back-reference from a navigation document to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ParentRef {
    /// The document as a whole, referenced by its navigation locator.
    Resource {
        /// Navigation locator of the document.
        #[serde(rename = "ref")]
        reference: String,
    },
    /// A fragment, referenced by id.
    CitableUnit {
        /// Fragment id.
        #[serde(rename = "ref")]
        reference: String,
    },
}

/// One navigation artifact.
///
/// Field order is the JSON key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationDocument {
    /// Fixed JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Context,
    /// Navigation locator of this document.
    #[serde(rename = "@id")]
    pub id: String,
    /// Deepest level of the document's fragment hierarchy.
    #[serde(rename = "citeDepth")]
    pub cite_depth: u32,
    /// Level the members belong to.
    pub level: u32,
    /// Fragments at `level` below the anchor, in document order.
    pub member: Vec<Member>,
    /// Passage URL template with a `{ref}` placeholder.
    pub passage: String,
    /// Parent reference, `null` for the document's first level.
    pub parent: Option<ParentRef>,
}

impl NavigationDocument {
    /// Pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, NavigationError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
