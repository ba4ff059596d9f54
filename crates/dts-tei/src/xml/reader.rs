//! Namespace-aware XML reading.
//!
//! Builds [`TreeNode`] trees from `quick_xml` events. The helpers are shared
//! by the whole-document parser and the streaming segmenter, which reads
//! individual subtrees out of a live event stream.

use std::io::BufRead;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::tree::TreeNode;
use crate::error::ParseError;

/// Parse a complete document and return its root element.
///
/// Comments, processing instructions and the doctype are dropped; CDATA
/// sections become plain text.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not well-formed XML, contains no
/// root element or has elements or text after the root element.
pub fn parse_document<R: BufRead>(source: R) -> Result<TreeNode, ParseError> {
    let mut reader = new_reader(source);
    let decoder = reader.decoder();
    let mut buf = Vec::new();
    let mut root = None;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = resolve_namespace(resolved)?;
        match event {
            Event::Start(_) | Event::Empty(_) if root.is_some() => {
                return Err(ParseError::TrailingContent);
            }
            Event::Start(e) => {
                let mut node = element_from_start(decoder, namespace, &e)?;
                read_children(&mut reader, &mut node)?;
                root = Some(node);
            }
            Event::Empty(e) => root = Some(element_from_start(decoder, namespace, &e)?),
            Event::End(e) => {
                return Err(ParseError::UnexpectedEnd(
                    decoder.decode(e.name().as_ref())?.into_owned(),
                ));
            }
            Event::Text(e) if root.is_some() => {
                if !is_blank(&decoder.decode(&e)?) {
                    return Err(ParseError::TrailingContent);
                }
            }
            Event::GeneralRef(_) | Event::CData(_) if root.is_some() => {
                return Err(ParseError::TrailingContent);
            }
            Event::Eof => return root.ok_or(ParseError::MissingRoot),
            Event::Text(_)
            | Event::GeneralRef(_)
            | Event::CData(_)
            | Event::Comment(_)
            | Event::Decl(_)
            | Event::PI(_)
            | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

/// Whether character data outside the root element is only whitespace.
pub(crate) fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Parse a document held in memory.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not well-formed XML.
pub fn parse_str(xml: &str) -> Result<TreeNode, ParseError> {
    parse_document(xml.as_bytes())
}

/// Create a reader that keeps whitespace untouched.
pub(crate) fn new_reader<R: BufRead>(source: R) -> NsReader<R> {
    let mut reader = NsReader::from_reader(source);
    reader.config_mut().trim_text(false);
    reader
}

/// Read the content of `node` up to and including its end tag.
///
/// # Errors
///
/// Returns [`ParseError::Unclosed`] if the stream ends before the end tag.
pub(crate) fn read_children<R: BufRead>(
    reader: &mut NsReader<R>,
    node: &mut TreeNode,
) -> Result<(), ParseError> {
    let decoder = reader.decoder();
    let mut buf = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = resolve_namespace(resolved)?;
        match event {
            Event::Start(e) => {
                let mut child = element_from_start(decoder, namespace, &e)?;
                read_children(reader, &mut child)?;
                node.children.push(child);
            }
            Event::Empty(e) => {
                node.children
                    .push(element_from_start(decoder, namespace, &e)?);
            }
            Event::Text(e) => node.append_text(&decoder.decode(&e)?),
            Event::GeneralRef(e) => node.append_text(&decode_reference(decoder, &e)?),
            Event::CData(e) => node.append_text(&decoder.decode(&e)?),
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(ParseError::Unclosed(node.name.clone())),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

/// Turn a namespace resolution result into an owned URI.
pub(crate) fn resolve_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>, ParseError> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(std::str::from_utf8(uri)?.to_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(ParseError::UnknownPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

/// Build a childless element from a start (or empty) tag.
pub(crate) fn element_from_start(
    decoder: Decoder,
    namespace: Option<String>,
    e: &BytesStart<'_>,
) -> Result<TreeNode, ParseError> {
    let name = decoder.decode(e.name().as_ref())?.into_owned();

    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }

    Ok(TreeNode {
        name,
        namespace,
        attrs,
        ..Default::default()
    })
}

/// Resolve a general entity or character reference to text.
pub(crate) fn decode_reference(decoder: Decoder, e: &BytesRef<'_>) -> Result<String, ParseError> {
    let entity = decoder.decode(e)?;
    decode_entity(&entity)
}

/// Map a reference name (without `&` and `;`) to its character value.
///
/// Only the five predefined entities and character references are known;
/// a document without DTD cannot declare others.
fn decode_entity(entity: &str) -> Result<String, ParseError> {
    let value = match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        s => s.strip_prefix('#').and_then(|code| {
            let code = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            code.filter(|&code| code != 0).and_then(char::from_u32)
        }),
    };
    value
        .map(String::from)
        .ok_or_else(|| ParseError::UnknownEntity(entity.to_owned()))
}
