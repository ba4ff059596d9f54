//! Navigation index over a fragment hierarchy.

use std::cmp::Ordering;
use std::collections::HashMap;

use dts_tei::{FragmentDescriptor, cite_depth};

use crate::document::{CONTEXT, Member, NavigationDocument, ParentRef};
use crate::error::NavigationError;
use crate::locator::Locators;

/// A navigation document and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    /// Anchor fragment, `None` for the document scope.
    pub reference: Option<String>,
    /// Level, `None` for the scope's `toplevel` alias.
    pub level: Option<u32>,
    /// The navigation document.
    pub document: NavigationDocument,
}

#[derive(Debug, Clone, Copy)]
struct Node<'a> {
    fragment: &'a FragmentDescriptor,
    parent: Option<&'a str>,
}

/// Navigation lookup over a completed fragment forest.
///
/// Ids are checked for uniqueness on construction.
#[derive(Debug)]
pub struct NavigationIndex<'a> {
    forest: &'a [FragmentDescriptor],
    nodes: HashMap<&'a str, Node<'a>>,
    cite_depth: u32,
    locators: Locators,
}

impl<'a> NavigationIndex<'a> {
    /// Index `forest` and compute its cite depth.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::DuplicateReference`] if two fragments share
    /// an id.
    pub fn new(
        forest: &'a [FragmentDescriptor],
        locators: Locators,
    ) -> Result<Self, NavigationError> {
        let mut nodes = HashMap::new();
        let mut stack: Vec<Node<'a>> = forest
            .iter()
            .rev()
            .map(|fragment| Node {
                fragment,
                parent: None,
            })
            .collect();

        while let Some(node) = stack.pop() {
            let id = node.fragment.id.as_str();
            if nodes.insert(id, node).is_some() {
                return Err(NavigationError::DuplicateReference(id.to_owned()));
            }
            stack.extend(node.fragment.children.iter().rev().map(|child| Node {
                fragment: child,
                parent: Some(id),
            }));
        }

        Ok(Self {
            forest,
            nodes,
            cite_depth: cite_depth(forest),
            locators,
        })
    }

    /// Deepest level of the hierarchy, 0 when empty.
    #[must_use]
    pub fn cite_depth(&self) -> u32 {
        self.cite_depth
    }

    /// Ids of fragments that have children, in document order.
    #[must_use]
    pub fn parents(&self) -> Vec<&'a str> {
        let mut out = Vec::new();
        dts_tei::walk(self.forest, &mut |fragment| {
            if !fragment.children.is_empty() {
                out.push(fragment.id.as_str());
            }
        });
        out
    }

    /// Navigation of the whole document at `level`.
    ///
    /// Returns `None` when no fragment sits at that level.
    #[must_use]
    pub fn document_level(&self, level: u32) -> Option<NavigationDocument> {
        let mut members = Vec::new();
        collect_members(self.forest, level, &mut members);
        if members.is_empty() {
            return None;
        }

        let parent = (level > 1).then(|| ParentRef::Resource {
            reference: self.locators.resource(),
        });
        Some(self.document(None, level, &members, parent))
    }

    /// Navigation below `reference` at `level`.
    ///
    /// Returns `Ok(None)` when the fragment has no descendants at that level.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::ReferenceNotFound`] if `reference` is not in
    /// the hierarchy.
    pub fn ref_level(
        &self,
        reference: &str,
        level: u32,
    ) -> Result<Option<NavigationDocument>, NavigationError> {
        let node = self
            .nodes
            .get(reference)
            .ok_or_else(|| NavigationError::ReferenceNotFound(reference.to_owned()))?;

        let mut members = Vec::new();
        collect_members(&node.fragment.children, level, &mut members);
        if members.is_empty() {
            return Ok(None);
        }

        let parent = match node.parent {
            Some(parent) if node.fragment.level > 1 => ParentRef::CitableUnit {
                reference: parent.to_owned(),
            },
            _ => ParentRef::Resource {
                reference: self.locators.resource(),
            },
        };
        Ok(Some(self.document(
            Some(reference),
            level,
            &members,
            Some(parent),
        )))
    }

    /// Every navigation document of the document scope.
    ///
    /// One entry per non-empty level, plus the `toplevel` alias of level 1.
    #[must_use]
    pub fn document_scope(&self) -> Vec<NavigationEntry> {
        let mut entries = Vec::new();
        for level in 1..=self.cite_depth {
            let Some(document) = self.document_level(level) else {
                continue;
            };
            if level == 1 {
                entries.push(NavigationEntry {
                    reference: None,
                    level: None,
                    document: document.clone(),
                });
            }
            entries.push(NavigationEntry {
                reference: None,
                level: Some(level),
                document,
            });
        }
        entries
    }

    /// Every navigation document anchored at `reference`.
    ///
    /// One entry per non-empty level below the fragment, plus the `toplevel`
    /// alias of the level right below it.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::ReferenceNotFound`] if `reference` is not in
    /// the hierarchy.
    pub fn ref_scope(&self, reference: &str) -> Result<Vec<NavigationEntry>, NavigationError> {
        let anchor_level = self
            .nodes
            .get(reference)
            .map(|node| node.fragment.level)
            .ok_or_else(|| NavigationError::ReferenceNotFound(reference.to_owned()))?;

        let mut entries = Vec::new();
        for level in anchor_level + 1..=self.cite_depth {
            let Some(document) = self.ref_level(reference, level)? else {
                continue;
            };
            if level == anchor_level + 1 {
                entries.push(NavigationEntry {
                    reference: Some(reference.to_owned()),
                    level: None,
                    document: document.clone(),
                });
            }
            entries.push(NavigationEntry {
                reference: Some(reference.to_owned()),
                level: Some(level),
                document,
            });
        }
        Ok(entries)
    }

    fn document(
        &self,
        reference: Option<&str>,
        level: u32,
        members: &[&str],
        parent: Option<ParentRef>,
    ) -> NavigationDocument {
        NavigationDocument {
            context: CONTEXT,
            id: self.locators.navigation(reference, Some(level)),
            cite_depth: self.cite_depth,
            level,
            member: members.iter().map(|id| Member::new(*id)).collect(),
            passage: self.locators.passage_template(),
            parent,
        }
    }
}

/// Collect ids at exactly `level`, descending only through shallower fragments.
fn collect_members<'f>(fragments: &'f [FragmentDescriptor], level: u32, out: &mut Vec<&'f str>) {
    for fragment in fragments {
        match fragment.level.cmp(&level) {
            Ordering::Equal => out.push(&fragment.id),
            Ordering::Less => collect_members(&fragment.children, level, out),
            Ordering::Greater => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn leaf(id: &str, level: u32) -> FragmentDescriptor {
        FragmentDescriptor::new(id, level)
    }

    /// a(1) > [a1(2) > [a1x(3)], a2(2)], b(1), c(1) > [c1(2)]
    fn forest() -> Vec<FragmentDescriptor> {
        vec![
            leaf("a", 1)
                .with_child(leaf("a1", 2).with_child(leaf("a1x", 3)))
                .with_child(leaf("a2", 2)),
            leaf("b", 1),
            leaf("c", 1).with_child(leaf("c1", 2)),
        ]
    }

    fn locators() -> Locators {
        Locators::new("/api/dts", "doc")
    }

    fn members(document: &NavigationDocument) -> Vec<&str> {
        document
            .member
            .iter()
            .map(|m| m.reference.as_str())
            .collect()
    }

    #[test]
    fn test_cite_depth() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        assert_eq!(index.cite_depth(), 3);
    }

    #[test]
    fn test_document_levels_follow_pre_order() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        assert_eq!(members(&index.document_level(1).unwrap()), vec!["a", "b", "c"]);
        assert_eq!(members(&index.document_level(2).unwrap()), vec!["a1", "a2", "c1"]);
        assert_eq!(members(&index.document_level(3).unwrap()), vec!["a1x"]);
        assert!(index.document_level(4).is_none());
    }

    #[test]
    fn test_document_level_parents() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        assert_eq!(index.document_level(1).unwrap().parent, None);
        assert_eq!(
            index.document_level(2).unwrap().parent,
            Some(ParentRef::Resource {
                reference: "/api/dts/navigation?id=doc".to_owned()
            })
        );
    }

    #[test]
    fn test_document_scope_has_toplevel_alias_only_for_level_one() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        let entries = index.document_scope();

        let keys: Vec<_> = entries.iter().map(|e| (e.reference.clone(), e.level)).collect();
        assert_eq!(
            keys,
            vec![(None, None), (None, Some(1)), (None, Some(2)), (None, Some(3))]
        );
        assert_eq!(entries[0].document, entries[1].document);
        assert_eq!(entries[1].document.id, "/api/dts/navigation?id=doc&level=1");
    }

    #[test]
    fn test_ref_scope_levels_and_parents() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        let entries = index.ref_scope("a").unwrap();

        let keys: Vec<_> = entries.iter().map(|e| e.level).collect();
        assert_eq!(keys, vec![None, Some(2), Some(3)]);
        assert_eq!(members(&entries[1].document), vec!["a1", "a2"]);
        assert_eq!(members(&entries[2].document), vec!["a1x"]);
        assert_eq!(
            entries[1].document.parent,
            Some(ParentRef::Resource {
                reference: "/api/dts/navigation?id=doc".to_owned()
            })
        );
        assert_eq!(
            entries[1].document.id,
            "/api/dts/navigation?id=doc&ref=a&level=2"
        );
    }

    #[test]
    fn test_nested_ref_has_citable_unit_parent() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        let entries = index.ref_scope("a1").unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, None);
        assert_eq!(members(&entries[1].document), vec!["a1x"]);
        assert_eq!(
            entries[1].document.parent,
            Some(ParentRef::CitableUnit {
                reference: "a".to_owned()
            })
        );
    }

    #[test]
    fn test_ref_scope_skips_empty_levels() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        let entries = index.ref_scope("c").unwrap();

        let keys: Vec<_> = entries.iter().map(|e| e.level).collect();
        assert_eq!(keys, vec![None, Some(2)]);
        assert!(index.ref_scope("b").unwrap().is_empty());
    }

    #[test]
    fn test_parents_in_document_order() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        assert_eq!(index.parents(), vec!["a", "a1", "c"]);
    }

    #[test]
    fn test_unknown_reference() {
        let forest = forest();
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        let err = index.ref_scope("zzz").unwrap_err();

        assert!(matches!(err, NavigationError::ReferenceNotFound(ref r) if r == "zzz"));
        assert!(index.ref_level("zzz", 2).is_err());
    }

    #[test]
    fn test_duplicate_reference() {
        let forest = vec![leaf("a", 1).with_child(leaf("x", 2)), leaf("x", 1)];

        let err = NavigationIndex::new(&forest, locators()).unwrap_err();

        assert!(matches!(err, NavigationError::DuplicateReference(ref r) if r == "x"));
    }

    #[test]
    fn test_empty_forest() {
        let index = NavigationIndex::new(&[], locators()).unwrap();

        assert_eq!(index.cite_depth(), 0);
        assert!(index.document_scope().is_empty());
        assert!(index.parents().is_empty());
    }

    #[test]
    fn test_flat_forest_has_single_level() {
        let forest = vec![leaf("pb-1", 1), leaf("pb-2", 1)];
        let index = NavigationIndex::new(&forest, locators()).unwrap();

        let entries = index.document_scope();

        assert_eq!(entries.len(), 2);
        assert_eq!(members(&entries[1].document), vec!["pb-1", "pb-2"]);
        assert_eq!(entries[1].document.cite_depth, 1);
    }
}
