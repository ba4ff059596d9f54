//! Structural segmentation along nested `div` elements.

use dts_storage::Storage;

use crate::error::{SegmentError, StructureError};
use crate::fragment::{FragmentDescriptor, Segmentation};
use crate::ids::IdAllocator;
use crate::layout::ArtifactLayout;
use crate::xml::{TreeNode, nested_document, to_document};
use crate::{TEI_NS, XML_ID, fragment_container};

/// Zones of `text` holding top-level sections, in output order.
const ZONES: [&str; 3] = ["front", "body", "back"];

/// Check that `root` is a TEI document with a `text` element.
///
/// # Errors
///
/// Returns [`StructureError`] naming the failed check.
pub fn check_structure(root: &TreeNode) -> Result<(), StructureError> {
    if !root.is(TEI_NS, "TEI") {
        return Err(StructureError::UnexpectedRoot {
            found: root.name.clone(),
        });
    }
    if root.child(TEI_NS, "text").is_none() {
        return Err(StructureError::MissingContainer("text"));
    }
    Ok(())
}

/// Splits a parsed TEI tree into one fragment per `div`.
///
/// Every `div` in `front`, `body` and `back` becomes a fragment, nested
/// `div`s become child fragments one level deeper. Missing `xml:id`s are
/// allocated and written back onto the tree, so the full document artifact
/// written at the end carries them too.
pub struct StructuralSegmenter<'a> {
    storage: &'a dyn Storage,
    layout: &'a ArtifactLayout,
    ids: &'a mut IdAllocator,
    wrapper_root: TreeNode,
}

impl<'a> StructuralSegmenter<'a> {
    /// Create a segmenter writing through `storage`.
    pub fn new(
        storage: &'a dyn Storage,
        layout: &'a ArtifactLayout,
        ids: &'a mut IdAllocator,
    ) -> Self {
        Self {
            storage,
            layout,
            ids,
            wrapper_root: TreeNode::default(),
        }
    }

    /// Segment `root`, writing every fragment and then the full document.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Structure`] if `root` is not a TEI document
    /// and [`SegmentError::Storage`] if an artifact cannot be written.
    pub fn segment(&mut self, root: &mut TreeNode) -> Result<Segmentation, SegmentError> {
        check_structure(root)?;

        root.walk(&mut |node| {
            if let Some(id) = node.xml_id() {
                self.ids.reserve(id);
            }
        });
        self.wrapper_root = root.namespace_shell();

        let text = root
            .child_mut(TEI_NS, "text")
            .ok_or(StructureError::MissingContainer("text"))?;

        let text_scope = scoped_container(&fragment_container(), text);
        let mut fragments = Vec::new();
        for zone in ZONES {
            let Some(zone) = text.child_mut(TEI_NS, zone) else {
                continue;
            };
            let container = scoped_container(&text_scope, zone);
            for div in zone.children.iter_mut().filter(|c| c.is(TEI_NS, "div")) {
                fragments.push(self.segment_div(div, 1, &container)?);
            }
        }

        self.storage
            .write(&self.layout.document(), to_document(root).as_bytes())?;

        tracing::info!(
            doc_id = self.layout.doc_id(),
            top_level = fragments.len(),
            "Structural segmentation finished"
        );

        Ok(Segmentation {
            fragments,
            warnings: Vec::new(),
        })
    }

    /// `container` carries the namespace declarations of every ancestor of
    /// `div` below the root element.
    fn segment_div(
        &mut self,
        div: &mut TreeNode,
        level: u32,
        container: &TreeNode,
    ) -> Result<FragmentDescriptor, SegmentError> {
        let id = if let Some(id) = div.xml_id() {
            id.to_owned()
        } else {
            let id = self.ids.allocate(div.local_name());
            div.set_attr(XML_ID, id.clone());
            id
        };

        let kind = div.attr("type").map(str::to_owned);
        let label = div
            .children_named(TEI_NS, "head")
            .map(TreeNode::text_content)
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(level, id = %id, kind = ?kind, label = %label, "Fragment");

        let inner = scoped_container(container, div);
        let mut children = Vec::new();
        for child in div.children.iter_mut().filter(|c| c.is(TEI_NS, "div")) {
            children.push(self.segment_div(child, level + 1, &inner)?);
        }

        let artifact = nested_document(&self.wrapper_root, container, &[&*div]);
        self.storage
            .write(&self.layout.fragment(&id), artifact.as_bytes())?;

        Ok(FragmentDescriptor {
            id,
            level,
            kind,
            label,
            children,
        })
    }
}

/// Fragment container for the content of `ancestor`.
///
/// Declarations made on `ancestor` win over the ones already in `outer`,
/// except the container's own `dts` binding.
fn scoped_container(outer: &TreeNode, ancestor: &TreeNode) -> TreeNode {
    let mut container = fragment_container();
    container.inherit_namespaces(ancestor.namespace_decls());
    container.inherit_namespaces(outer.attrs.iter());
    container
}

#[cfg(test)]
mod tests {
    use dts_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::DTS_NS;
    use crate::xml::parse_str;

    const HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

    fn segment(source: &str, storage: &MockStorage) -> Result<Segmentation, SegmentError> {
        let layout = ArtifactLayout::new("doc").unwrap();
        let mut ids = IdAllocator::default();
        let mut root = parse_str(source).unwrap();
        StructuralSegmenter::new(storage, &layout, &mut ids).segment(&mut root)
    }

    fn ids_of(forest: &[FragmentDescriptor]) -> Vec<(&str, u32)> {
        let mut out = Vec::new();
        crate::fragment::walk(forest, &mut |f| out.push((f.id.as_str(), f.level)));
        out
    }

    #[test]
    fn test_zones_in_order_with_nesting() {
        let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text>
            <back><div xml:id="z"/></back>
            <front><div xml:id="a"><div xml:id="a1"><div xml:id="a1x"/></div></div></front>
            <body><div xml:id="b"/><p/><div xml:id="c"/></body>
        </text></TEI>"#;
        let storage = MockStorage::new();

        let result = segment(source, &storage).unwrap();

        assert_eq!(
            ids_of(&result.fragments),
            vec![("a", 1), ("a1", 2), ("a1x", 3), ("b", 1), ("c", 1), ("z", 1)]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_allocates_missing_ids_pre_order() {
        let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body>
            <div><div/></div><div xml:id="genid-div3"/><div/>
        </body></text></TEI>"#;
        let storage = MockStorage::new();

        let result = segment(source, &storage).unwrap();

        assert_eq!(
            ids_of(&result.fragments),
            vec![
                ("genid-div1", 1),
                ("genid-div2", 2),
                ("genid-div3", 1),
                ("genid-div4", 1),
            ]
        );
        let document = storage.text("doc/document.xml").unwrap();
        assert!(document.contains(r#"<div xml:id="genid-div1"><div xml:id="genid-div2"/></div>"#));
    }

    #[test]
    fn test_label_and_kind() {
        let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body>
            <div type="chapter"><head>Book <hi>I</hi></head><head>Arms</head><p>x</p></div>
            <div><p>no head</p></div>
        </body></text></TEI>"#;
        let storage = MockStorage::new();

        let result = segment(source, &storage).unwrap();

        assert_eq!(result.fragments[0].kind.as_deref(), Some("chapter"));
        assert_eq!(result.fragments[0].label, "Book I Arms");
        assert_eq!(result.fragments[1].kind, None);
        assert_eq!(result.fragments[1].label, "");
    }

    #[test]
    fn test_fragment_artifact_wraps_subtree() {
        let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0" xml:lang="la"><teiHeader/><text><body><div xml:id="d1" n="1"><p>a &amp; b</p><div><p>c</p></div></div>
        </body></text></TEI>"#;
        let storage = MockStorage::new();

        segment(source, &storage).unwrap();

        assert_eq!(
            storage.text("doc/document/d1.xml").unwrap(),
            format!(
                "{HEADER}<TEI xmlns=\"http://www.tei-c.org/ns/1.0\">\
                 <dts:wrapper xmlns:dts=\"https://w3id.org/dts/api#\">\
                 <div xml:id=\"d1\" n=\"1\"><p>a &amp; b</p><div xml:id=\"genid-div1\"><p>c</p></div></div>\
                 </dts:wrapper></TEI>"
            )
        );
        assert!(storage.exists("doc/document/genid-div1.xml"));
        assert_eq!(storage.len(), 3);
    }

    #[test]
    fn test_fragment_keeps_ancestor_namespaces() {
        let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text>
            <body xmlns:xi="http://www.w3.org/2001/XInclude">
            <div xml:id="d1" xmlns:ex="urn:ex"><xi:include href="x"/><div xml:id="d2"><ex:note/></div></div>
        </body></text></TEI>"#;
        let storage = MockStorage::new();

        segment(source, &storage).unwrap();

        let outer = parse_str(&storage.text("doc/document/d1.xml").unwrap()).unwrap();
        let include = &outer.children[0].children[0].children[0];
        assert_eq!(include.namespace.as_deref(), Some("http://www.w3.org/2001/XInclude"));

        let inner = parse_str(&storage.text("doc/document/d2.xml").unwrap()).unwrap();
        let container = &inner.children[0];
        assert_eq!(
            container.attrs,
            vec![
                ("xmlns:dts".to_owned(), DTS_NS.to_owned()),
                ("xmlns:ex".to_owned(), "urn:ex".to_owned()),
                ("xmlns:xi".to_owned(), "http://www.w3.org/2001/XInclude".to_owned()),
            ]
        );
        assert_eq!(container.children[0].children[0].namespace.as_deref(), Some("urn:ex"));
    }

    #[test]
    fn test_missing_zones_are_not_errors() {
        let source = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text/></TEI>"#;
        let storage = MockStorage::new();

        let result = segment(source, &storage).unwrap();

        assert!(result.fragments.is_empty());
        assert!(storage.exists("doc/document.xml"));
    }

    #[test]
    fn test_rejects_non_tei_root() {
        let storage = MockStorage::new();

        let err = segment("<html><text/></html>", &storage).unwrap_err();

        assert!(matches!(
            err,
            SegmentError::Structure(StructureError::UnexpectedRoot { ref found }) if found == "html"
        ));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_rejects_tei_without_namespace() {
        let err = check_structure(&parse_str("<TEI><text/></TEI>").unwrap()).unwrap_err();

        assert_eq!(
            err,
            StructureError::UnexpectedRoot {
                found: "TEI".to_owned()
            }
        );
    }

    #[test]
    fn test_rejects_missing_text() {
        let storage = MockStorage::new();

        let err = segment(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><teiHeader/></TEI>"#,
            &storage,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SegmentError::Structure(StructureError::MissingContainer("text"))
        ));
        assert!(err.to_string().contains("missing <text>"));
    }

    #[test]
    fn test_storage_failure_is_fatal() {
        let storage = MockStorage::new().failing_prefix("doc/document/");

        let err = segment(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body><div/></body></text></TEI>"#,
            &storage,
        )
        .unwrap_err();

        assert!(matches!(err, SegmentError::Storage(_)));
    }
}
