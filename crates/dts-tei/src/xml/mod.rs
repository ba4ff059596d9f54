//! XML parsing and serialization services.

mod reader;
mod tree;
mod writer;

pub use reader::{parse_document, parse_str};
pub(crate) use reader::{
    decode_reference, element_from_start, is_blank, new_reader, read_children, resolve_namespace,
};
pub use tree::{TreeNode, is_namespace_decl, local_name};
pub use writer::{XML_DECLARATION, nested_document, to_document, to_string};
