//! Positional segmentation at marker elements.
//!
//! The source is read twice, both times strictly forward: a first pass
//! collects the facsimile entries markers may point to, the second pass cuts
//! the stream at every marker. Each fragment runs from its marker up to the
//! next one. Elements that are open at the cut are re-created as empty
//! scaffolding at the start of the next fragment, so every fragment is a
//! well-formed document of its own.

use std::collections::HashMap;
use std::io::BufRead;

use dts_storage::Storage;
use quick_xml::events::Event;

use crate::error::{ParseError, SegmentError, Warning};
use crate::fragment::{FragmentDescriptor, Segmentation};
use crate::ids::IdAllocator;
use crate::layout::ArtifactLayout;
use crate::xml::{
    TreeNode, decode_reference, element_from_start, is_blank, new_reader, read_children,
    resolve_namespace, to_document,
};
use crate::{TEI_NS, fragment_container};

/// Default marker element (page break).
pub const DEFAULT_MARKER: &str = "pb";

/// Marker attribute pointing into the facsimile table.
const SIDE_REFERENCE_ATTR: &str = "facs";

/// Marker attribute used as fragment label.
const LABEL_ATTR: &str = "n";

/// Facsimile entries (`surface`, `graphic`, ...) keyed by `xml:id`.
#[derive(Debug, Clone, Default)]
pub struct FacsimileTable {
    entries: HashMap<String, TreeNode>,
}

/// Result of the first pass over the source.
#[derive(Debug, Clone, Default)]
pub struct Prescan {
    /// Facsimile entries markers can refer to.
    pub facsimiles: FacsimileTable,
    /// Every `xml:id` found in the source.
    pub source_ids: Vec<String>,
}

impl FacsimileTable {
    /// Scan `source` for `facsimile` elements and collect their children.
    ///
    /// Only element children carrying an `xml:id` are kept. Each entry gets
    /// the namespace declarations of its ancestors below the root element,
    /// so it can be written on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the source is not well-formed.
    pub fn scan<R: BufRead>(source: R) -> Result<Prescan, ParseError> {
        let mut reader = new_reader(source);
        let decoder = reader.decoder();
        let mut buf = Vec::new();
        let mut entries = HashMap::new();
        let mut source_ids = Vec::new();
        // Namespace declarations of every open element, root first.
        let mut scopes: Vec<Vec<(String, String)>> = Vec::new();

        loop {
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            let namespace = resolve_namespace(resolved)?;
            match event {
                Event::Start(e) => {
                    let mut node = element_from_start(decoder, namespace, &e)?;
                    if node.is(TEI_NS, "facsimile") {
                        read_children(&mut reader, &mut node)?;
                        node.walk(&mut |n| source_ids.extend(n.xml_id().map(str::to_owned)));
                        let own: Vec<_> = node.namespace_decls().cloned().collect();
                        for mut child in node.children {
                            if let Some(id) = child.xml_id().map(str::to_owned) {
                                child.tail.clear();
                                child.inherit_namespaces(&own);
                                for scope in scopes.iter().skip(1).rev() {
                                    child.inherit_namespaces(scope);
                                }
                                entries.insert(id, child);
                            }
                        }
                    } else {
                        source_ids.extend(node.xml_id().map(str::to_owned));
                        scopes.push(node.namespace_decls().cloned().collect());
                    }
                }
                Event::End(_) => {
                    scopes.pop();
                }
                Event::Empty(e) => {
                    let node = element_from_start(decoder, namespace, &e)?;
                    source_ids.extend(node.xml_id().map(str::to_owned));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        tracing::debug!(entries = entries.len(), "Facsimile table built");
        Ok(Prescan {
            facsimiles: Self { entries },
            source_ids,
        })
    }

    /// Look up an entry by reference, with or without a leading `#`.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<&TreeNode> {
        self.entries.get(strip_fragment_marker(reference))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strip_fragment_marker(reference: &str) -> &str {
    reference.strip_prefix('#').unwrap_or(reference)
}

/// Kind of the last structural event seen before pending text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastEvent {
    Open,
    Close,
}

/// Character data not yet attached to the fragment tree.
#[derive(Debug)]
struct PendingText {
    text: String,
    after: LastEvent,
}

impl PendingText {
    fn new() -> Self {
        Self {
            text: String::new(),
            after: LastEvent::Open,
        }
    }

    /// Attach buffered text to the open fragment, if any.
    fn flush(&mut self, fragment: Option<&mut OpenFragment>) {
        if self.text.is_empty() {
            return;
        }
        if let Some(fragment) = fragment {
            fragment.push_text(&self.text, self.after);
        }
        self.text.clear();
    }
}

/// Fragment under construction.
#[derive(Debug)]
struct OpenFragment {
    descriptor: FragmentDescriptor,
    /// Wrapper root, container, then one node per open element below the
    /// document element.
    open: Vec<TreeNode>,
}

impl OpenFragment {
    /// Start a fragment with scaffolding for every open element in `frames`.
    fn start(
        descriptor: FragmentDescriptor,
        frames: &[TreeNode],
        side_content: Option<TreeNode>,
    ) -> Self {
        let mut open = Vec::with_capacity(frames.len() + 1);
        open.push(
            frames
                .first()
                .map(TreeNode::namespace_shell)
                .unwrap_or_default(),
        );
        let mut container = fragment_container();
        container.children.extend(side_content);
        open.push(container);
        open.extend(frames.iter().skip(1).map(TreeNode::shell));

        Self { descriptor, open }
    }

    fn push_text(&mut self, text: &str, after: LastEvent) {
        let Some(node) = self.open.last_mut() else {
            return;
        };
        match after {
            LastEvent::Open => node.text.push_str(text),
            LastEvent::Close => node.append_text(text),
        }
    }

    /// Enter a child element.
    fn open(&mut self, node: TreeNode) {
        self.open.push(node);
    }

    /// Leave the innermost open element.
    fn close(&mut self) {
        if self.open.len() <= 2 {
            return;
        }
        if let Some(node) = self.open.pop()
            && let Some(parent) = self.open.last_mut()
        {
            parent.children.push(node);
        }
    }

    /// Add an element that has no content.
    fn append(&mut self, node: TreeNode) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
        }
    }

    /// Close everything still open and return the fragment document.
    fn finish(mut self) -> (FragmentDescriptor, TreeNode) {
        let mut root = TreeNode::default();
        while let Some(node) = self.open.pop() {
            match self.open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => root = node,
            }
        }
        (self.descriptor, root)
    }
}

/// Splits a document at every occurrence of a marker element.
///
/// Produces one level-1 fragment per marker, with ids `{marker}-1`,
/// `{marker}-2`, ... Content before the first marker belongs to no fragment.
pub struct PositionalSegmenter<'a> {
    storage: &'a dyn Storage,
    layout: &'a ArtifactLayout,
    ids: &'a mut IdAllocator,
    marker: String,
    fragments: Vec<FragmentDescriptor>,
    warnings: Vec<Warning>,
}

impl<'a> PositionalSegmenter<'a> {
    /// Create a segmenter cutting at `marker` (local name in the TEI
    /// namespace).
    pub fn new(
        storage: &'a dyn Storage,
        layout: &'a ArtifactLayout,
        ids: &'a mut IdAllocator,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            layout,
            ids,
            marker: marker.into(),
            fragments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Segment the source.
    ///
    /// `prescan` and `source` must yield the same document; the first is
    /// consumed by the facsimile pass, the second by segmentation.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Parse`] if the source is not well-formed and
    /// [`SegmentError::Storage`] if a fragment cannot be written.
    pub fn segment<P: BufRead, R: BufRead>(
        &mut self,
        prescan: P,
        source: R,
    ) -> Result<Segmentation, SegmentError> {
        let Prescan {
            facsimiles,
            source_ids,
        } = FacsimileTable::scan(prescan)?;
        for id in source_ids {
            self.ids.reserve(id);
        }

        let mut reader = new_reader(source);
        let decoder = reader.decoder();
        let mut buf = Vec::new();
        let mut frames: Vec<TreeNode> = Vec::new();
        let mut current: Option<OpenFragment> = None;
        let mut pending = PendingText::new();
        let mut seen_root = false;
        let mut root_closed = false;

        loop {
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            let namespace = resolve_namespace(resolved)?;
            match event {
                Event::Start(_) | Event::Empty(_) if root_closed => {
                    return Err(ParseError::TrailingContent.into());
                }
                Event::Start(e) => {
                    let node = element_from_start(decoder, namespace, &e)?;
                    pending.flush(current.as_mut());
                    if self.is_marker(&node, &frames) {
                        self.begin(&mut current, &frames, &node, &facsimiles)?;
                    }
                    if !frames.is_empty()
                        && let Some(fragment) = current.as_mut()
                    {
                        fragment.open(node.clone());
                    }
                    seen_root = true;
                    frames.push(node);
                    pending.after = LastEvent::Open;
                }
                Event::Empty(e) => {
                    let node = element_from_start(decoder, namespace, &e)?;
                    pending.flush(current.as_mut());
                    if self.is_marker(&node, &frames) {
                        self.begin(&mut current, &frames, &node, &facsimiles)?;
                    }
                    if let Some(fragment) = current.as_mut() {
                        fragment.append(node);
                    }
                    seen_root = true;
                    root_closed = frames.is_empty();
                    pending.after = LastEvent::Close;
                }
                Event::End(e) => {
                    pending.flush(current.as_mut());
                    if frames.pop().is_none() {
                        let name = decoder.decode(e.name().as_ref())?.into_owned();
                        return Err(ParseError::UnexpectedEnd(name).into());
                    }
                    if !frames.is_empty()
                        && let Some(fragment) = current.as_mut()
                    {
                        fragment.close();
                    }
                    root_closed = frames.is_empty();
                    pending.after = LastEvent::Close;
                }
                Event::Text(e) => {
                    let text = decoder.decode(&e)?;
                    if root_closed && !is_blank(&text) {
                        return Err(ParseError::TrailingContent.into());
                    }
                    if current.is_some() && !frames.is_empty() {
                        pending.text.push_str(&text);
                    }
                }
                Event::GeneralRef(_) | Event::CData(_) if root_closed => {
                    return Err(ParseError::TrailingContent.into());
                }
                Event::GeneralRef(e) => {
                    if current.is_some() && !frames.is_empty() {
                        pending.text.push_str(&decode_reference(decoder, &e)?);
                    }
                }
                Event::CData(e) => {
                    if current.is_some() && !frames.is_empty() {
                        pending.text.push_str(&decoder.decode(&e)?);
                    }
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }

        if let Some(open) = frames.last() {
            return Err(ParseError::Unclosed(open.name.clone()).into());
        }
        if !seen_root {
            return Err(ParseError::MissingRoot.into());
        }
        if let Some(fragment) = current.take() {
            self.persist(fragment)?;
        }

        if self.fragments.is_empty() {
            let warning = Warning::NoMarkers {
                marker: self.marker.clone(),
            };
            tracing::warn!(%warning, "Positional segmentation produced nothing");
            self.warnings.push(warning);
        }

        tracing::info!(
            doc_id = self.layout.doc_id(),
            fragments = self.fragments.len(),
            marker = %self.marker,
            "Positional segmentation finished"
        );

        Ok(Segmentation {
            fragments: std::mem::take(&mut self.fragments),
            warnings: std::mem::take(&mut self.warnings),
        })
    }

    /// Markers are recognized below the document element, in the TEI
    /// namespace or without namespace.
    fn is_marker(&self, node: &TreeNode, frames: &[TreeNode]) -> bool {
        !frames.is_empty()
            && node.local_name() == self.marker
            && node.namespace.as_deref().is_none_or(|ns| ns == TEI_NS)
    }

    /// Close the current fragment and open a new one at `marker`.
    fn begin(
        &mut self,
        current: &mut Option<OpenFragment>,
        frames: &[TreeNode],
        marker: &TreeNode,
        facsimiles: &FacsimileTable,
    ) -> Result<(), SegmentError> {
        if let Some(done) = current.take() {
            self.persist(done)?;
        }

        let kind = marker.local_name().to_owned();
        let id = self.ids.next_sequence(&kind);
        let label = marker.attr(LABEL_ATTR).unwrap_or_default().to_owned();

        let side_content = match marker.attr(SIDE_REFERENCE_ATTR) {
            Some(reference) => {
                let resolved = facsimiles.resolve(reference).cloned();
                if resolved.is_none() {
                    let warning = Warning::UnresolvedSideReference {
                        fragment: id.clone(),
                        reference: strip_fragment_marker(reference).to_owned(),
                    };
                    tracing::warn!(%warning, "Fragment has no facsimile");
                    self.warnings.push(warning);
                }
                resolved
            }
            None => None,
        };

        tracing::debug!(level = 1, id = %id, kind = %kind, label = %label, "Fragment");
        let descriptor = FragmentDescriptor::new(id, 1)
            .with_kind(kind)
            .with_label(label);
        *current = Some(OpenFragment::start(descriptor, frames, side_content));
        Ok(())
    }

    fn persist(&mut self, fragment: OpenFragment) -> Result<(), SegmentError> {
        let (descriptor, root) = fragment.finish();
        self.storage.write(
            &self.layout.fragment(&descriptor.id),
            to_document(&root).as_bytes(),
        )?;
        self.fragments.push(descriptor);
        Ok(())
    }
}
