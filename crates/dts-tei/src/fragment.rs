//! Fragment hierarchy produced by the segmenters.

use crate::error::Warning;

/// One node of the fragment hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDescriptor {
    /// Fragment id, unique within the document.
    pub id: String,
    /// Depth, 1 for top-level fragments.
    pub level: u32,
    /// Classification (`type` attribute, or the marker name).
    pub kind: Option<String>,
    /// Heading text or marker label, possibly empty.
    pub label: String,
    /// Child fragments in document order.
    pub children: Vec<FragmentDescriptor>,
}

impl FragmentDescriptor {
    /// Create a leaf fragment.
    #[must_use]
    pub fn new(id: impl Into<String>, level: u32) -> Self {
        Self {
            id: id.into(),
            level,
            kind: None,
            label: String::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set kind.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Builder: set label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder: append child.
    #[must_use]
    pub fn with_child(mut self, child: FragmentDescriptor) -> Self {
        self.children.push(child);
        self
    }

    /// Deepest level in this subtree.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.children
            .iter()
            .map(FragmentDescriptor::max_level)
            .fold(self.level, u32::max)
    }

    /// Number of fragments in this subtree, itself included.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(FragmentDescriptor::count).sum::<usize>()
    }
}

/// Result of one segmentation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    /// Top-level fragments with their descendants, in document order.
    pub fragments: Vec<FragmentDescriptor>,
    /// Recoverable problems met along the way.
    pub warnings: Vec<Warning>,
}

impl Segmentation {
    /// Total number of fragments in the forest.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.iter().map(FragmentDescriptor::count).sum()
    }
}

/// Maximum level in the forest, 0 when empty.
#[must_use]
pub fn cite_depth(forest: &[FragmentDescriptor]) -> u32 {
    forest
        .iter()
        .map(FragmentDescriptor::max_level)
        .max()
        .unwrap_or(0)
}

/// Visit every fragment of the forest in document pre-order.
pub fn walk<'a>(forest: &'a [FragmentDescriptor], visit: &mut impl FnMut(&'a FragmentDescriptor)) {
    for fragment in forest {
        visit(fragment);
        walk(&fragment.children, visit);
    }
}
