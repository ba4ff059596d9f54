//! Error and warning types for segmentation.

use std::str::Utf8Error;

use dts_storage::StorageError;

/// Malformed XML input.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// XML syntax error, including mismatched end tags.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error while decoding names or text.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// UTF-8 decoding error in a namespace URI.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] Utf8Error),

    /// Element uses a prefix that no `xmlns:` declaration binds.
    #[error("unbound namespace prefix '{0}'")]
    UnknownPrefix(String),

    /// Input ended before the root element was seen.
    #[error("document has no root element")]
    MissingRoot,

    /// Input ended while an element was still open.
    #[error("element <{0}> is not closed at end of input")]
    Unclosed(String),

    /// End tag without a matching open element.
    #[error("unexpected end tag </{0}>")]
    UnexpectedEnd(String),

    /// Element or text after the end of the root element.
    #[error("content after the end of the root element")]
    TrailingContent,

    /// Reference to an entity that is neither predefined nor a valid
    /// character reference.
    #[error("unknown entity reference '&{0};'")]
    UnknownEntity(String),
}

/// Source document does not have the TEI shape needed for structural
/// segmentation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StructureError {
    /// Root element is not `TEI` in the TEI namespace.
    #[error("not a TEI document: root element is <{found}>, expected <TEI> in {}", crate::TEI_NS)]
    UnexpectedRoot {
        /// Qualified name of the actual root element.
        found: String,
    },

    /// A required container element is missing.
    #[error("not a TEI document: missing <{0}> element")]
    MissingContainer(&'static str),
}

/// Fatal error of one segmentation run.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// Structural check failed.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Source is not well-formed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Fragment artifact could not be written.
    #[error("failed to write fragment: {0}")]
    Storage(#[from] StorageError),

    /// Source could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for SegmentError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Parse(e.into())
    }
}

impl From<quick_xml::encoding::EncodingError> for SegmentError {
    fn from(e: quick_xml::encoding::EncodingError) -> Self {
        Self::Parse(e.into())
    }
}

/// Recoverable problem reported alongside a successful run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Warning {
    /// Marker references a facsimile entry that does not exist.
    #[error("fragment {fragment}: facsimile reference '{reference}' not found")]
    UnresolvedSideReference {
        /// Fragment id allocated for the marker.
        fragment: String,
        /// Reference as written on the marker, without a leading `#`.
        reference: String,
    },

    /// Positional segmentation never saw the marker element.
    #[error("no <{marker}> element found, no fragments produced")]
    NoMarkers {
        /// Marker local name.
        marker: String,
    },
}
