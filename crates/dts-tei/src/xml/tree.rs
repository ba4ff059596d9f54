//! Element tree used by the segmenters.

/// Element node with namespace, ordered attributes and text/tail content.
///
/// `text` is the character data before the first child, `tail` the character
/// data that follows the element's end tag inside its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Qualified element name as written in the source (e.g. `tei:div`).
    pub name: String,
    /// Resolved namespace URI, if the element is bound to one.
    pub namespace: Option<String>,
    /// Attributes in source order, namespace declarations included.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: String,
    /// Text after this element's end tag.
    pub tail: String,
    /// Child elements in document order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a new element without namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set resolved namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Builder: append attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// Builder: set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: set tail text.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Builder: append child.
    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Element name without prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Check namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local
    }

    /// Get attribute value by qualified name.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set attribute value, replacing an existing one in place.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((key.to_owned(), value)),
        }
    }

    /// Value of the `xml:id` attribute.
    #[must_use]
    pub fn xml_id(&self) -> Option<&str> {
        self.attr(crate::XML_ID)
    }

    /// First child with the given namespace and local name.
    #[must_use]
    pub fn child(&self, namespace: &str, local: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.is(namespace, local))
    }

    /// Mutable access to the first matching child.
    pub fn child_mut(&mut self, namespace: &str, local: &str) -> Option<&mut TreeNode> {
        self.children.iter_mut().find(|c| c.is(namespace, local))
    }

    /// Iterate over children with the given namespace and local name.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, local))
    }

    /// All character data inside this element, in document order.
    ///
    /// The element's own tail is not included.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Copy of this element with the same name and attributes but no content.
    #[must_use]
    pub fn shell(&self) -> TreeNode {
        TreeNode {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            attrs: self.attrs.clone(),
            ..Default::default()
        }
    }

    /// Copy of this element keeping only its namespace declarations.
    #[must_use]
    pub fn namespace_shell(&self) -> TreeNode {
        TreeNode {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            attrs: self.namespace_decls().cloned().collect(),
            ..Default::default()
        }
    }

    /// Namespace declarations made on this element.
    pub fn namespace_decls(&self) -> impl Iterator<Item = &(String, String)> {
        self.attrs.iter().filter(|(k, _)| is_namespace_decl(k))
    }

    /// Add the namespace declarations in `decls` that this element does not
    /// make itself.
    ///
    /// Used when an element is written away from its ancestors, so prefixes
    /// bound above it stay bound.
    pub fn inherit_namespaces<'a>(
        &mut self,
        decls: impl IntoIterator<Item = &'a (String, String)>,
    ) {
        for (key, value) in decls {
            if self.attr(key).is_none() {
                self.attrs.push((key.clone(), value.clone()));
            }
        }
    }

    /// Append character data at the end of this element's content.
    ///
    /// Goes to the last child's tail when there is one, otherwise to `text`.
    pub fn append_text(&mut self, text: &str) {
        if let Some(last_child) = self.children.last_mut() {
            last_child.tail.push_str(text);
        } else {
            self.text.push_str(text);
        }
    }

    /// Visit this element and all descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Strip the prefix from a qualified name.
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Whether an attribute name declares a namespace (`xmlns` or `xmlns:*`).
#[must_use]
pub fn is_namespace_decl(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}
