//! XML serialization for [`TreeNode`] trees.

use super::tree::TreeNode;

/// Declaration written at the top of every XML artifact.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serialize `root` as a standalone document with an XML declaration.
///
/// The root's own tail is not written.
#[must_use]
pub fn to_document(root: &TreeNode) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    write_element(root, &mut out);
    out
}

/// Serialize one element and its content, without its tail.
#[must_use]
pub fn to_string(node: &TreeNode) -> String {
    let mut out = String::new();
    write_element(node, &mut out);
    out
}

/// Append the serialized element (without tail) to `out`.
pub fn write_element(node: &TreeNode, out: &mut String) {
    write_open(node, out);

    if node.children.is_empty() && node.text.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    write_content(node, out);
    write_close(node, out);
}

/// Append the start tag of `node` without the closing `>`.
fn write_open(node: &TreeNode, out: &mut String) {
    out.push('<');
    out.push_str(&node.name);
    for (key, value) in &node.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_into(value, true, out);
        out.push('"');
    }
}

/// Append text and children of `node`, including the children's tails.
fn write_content(node: &TreeNode, out: &mut String) {
    escape_into(&node.text, false, out);
    for child in &node.children {
        write_element(child, out);
        escape_into(&child.tail, false, out);
    }
}

fn write_close(node: &TreeNode, out: &mut String) {
    out.push_str("</");
    out.push_str(&node.name);
    out.push('>');
}

/// Serialize `outer` with `inner` as its only child, followed by `body`.
///
/// Writes the same bytes as `to_document` on the equivalent nested tree, but
/// borrows `body` instead of moving it into a container.
#[must_use]
pub fn nested_document(outer: &TreeNode, inner: &TreeNode, body: &[&TreeNode]) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);

    write_open(outer, &mut out);
    out.push('>');
    write_open(inner, &mut out);
    if body.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        for node in body {
            write_element(node, &mut out);
        }
        write_close(inner, &mut out);
    }
    write_close(outer, &mut out);
    out
}

/// Escape XML special characters into `out`.
///
/// Attribute values additionally escape quotes and whitespace control
/// characters so they survive attribute value normalization.
fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}
