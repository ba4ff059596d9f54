//! DTS navigation index builder.
//!
//! Turns the fragment forest produced by segmentation into navigation
//! documents: one per populated level of the whole document, and one per
//! populated level below every fragment that has children. Each scope also
//! gets a `toplevel` alias for its first level.
//!
//! # Example
//!
//! ```ignore
//! use dts_navigation::{Locators, NavigationIndex};
//!
//! let index = NavigationIndex::new(&segmentation.fragments, Locators::new("/api/dts", "ovid"))?;
//! for entry in index.document_scope() {
//!     println!("{:?} {}", entry.level, entry.document.to_json()?);
//! }
//! ```

mod document;
mod error;
mod index;
mod locator;

pub use document::{CONTEXT, Context, Member, NavigationDocument, ParentRef};
pub use error::NavigationError;
pub use index::{NavigationEntry, NavigationIndex};
pub use locator::{DEFAULT_BASE_URL, Locators};
