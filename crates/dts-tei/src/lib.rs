//! TEI document segmentation.
//!
//! Splits a TEI document into addressable fragments and writes one XML
//! artifact per fragment through a [`dts_storage::Storage`] backend. Two
//! policies are available:
//!
//! - [`StructuralSegmenter`]: one fragment per `div`, nested like the source
//! - [`PositionalSegmenter`]: one flat fragment per marker element (`pb` by
//!   default), built from a single forward pass over the source
//!
//! Both return the same [`FragmentDescriptor`] forest, which the navigation
//! builder turns into navigation documents.

mod error;
mod fragment;
mod ids;
mod layout;
mod positional;
mod structural;
pub mod xml;

pub use error::{ParseError, SegmentError, StructureError, Warning};
pub use fragment::{FragmentDescriptor, Segmentation, cite_depth, walk};
pub use ids::{DEFAULT_ID_PREFIX, IdAllocator};
pub use layout::{ArtifactLayout, InvalidDocumentId};
pub use positional::{DEFAULT_MARKER, FacsimileTable, PositionalSegmenter, Prescan};
pub use structural::{StructuralSegmenter, check_structure};

use xml::TreeNode;

/// TEI namespace URI.
pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

/// DTS namespace URI, used by the fragment container.
pub const DTS_NS: &str = "https://w3id.org/dts/api#";

/// Qualified name of the XML id attribute.
pub const XML_ID: &str = "xml:id";

/// Qualified name of the element wrapping fragment content.
pub const FRAGMENT_CONTAINER: &str = "dts:wrapper";

/// Empty `<dts:wrapper xmlns:dts="https://w3id.org/dts/api#">` element.
#[must_use]
pub fn fragment_container() -> TreeNode {
    TreeNode::new(FRAGMENT_CONTAINER)
        .with_namespace(DTS_NS)
        .with_attr("xmlns:dts", DTS_NS)
}
