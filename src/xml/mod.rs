//! Safe navigation over parsed XML documents
//!
//! Both dialect extractors work against an owned element tree built from the
//! raw response bytes. The free functions in this module are the only way the
//! extractors touch the tree: lookups return `Option` or an empty `Vec`
//! instead of failing when an element is absent.

pub mod path;

use std::borrow::Cow;

use quick_xml::encoding::detect_encoding;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Decoder, Reader};
use tracing::{debug, warn};

use crate::error::{NcbiError, Result};
pub use path::ElementPath;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and mixed content
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    nodes: Vec<Node>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            nodes: Vec::new(),
        }
    }

    /// Qualified tag name, e.g. `article-title` or `mml:math`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by qualified name
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == attribute)
            .map(|(_, value)| value.as_str())
    }

    /// Text preceding the first child element, if any
    pub fn text(&self) -> Option<&str> {
        match self.nodes.first() {
            Some(Node::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Child elements in document order
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.children().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// First element matching `path`, see [`find_safe`]
    pub fn find(&self, path: &str) -> Option<&Element> {
        find_safe(self, path)
    }

    /// All elements matching `path`, see [`find_all`]
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        find_all(self, path)
    }

    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(previous)) = self.nodes.last_mut() {
            previous.push_str(&text);
        } else {
            self.nodes.push(Node::Text(text));
        }
    }

    fn collect_text_into(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(child) => child.collect_text_into(out),
            }
        }
    }
}

/// Pre-order iterator over descendant elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.children());
        self.stack[start..].reverse();
        Some(element)
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct XmlTree {
    root: Element,
}

impl XmlTree {
    /// Parse a document from raw bytes
    ///
    /// The encoding comes from the byte order mark or the `encoding` of the
    /// XML declaration, falling back to UTF-8. UTF-16 input is transcoded
    /// before parsing. Comments, processing instructions and the doctype are
    /// dropped; CDATA sections become text.
    pub fn from_raw(data: &[u8]) -> Result<Self> {
        match detect_encoding(data) {
            Some((encoding, bom)) if encoding.name().starts_with("UTF-16") => {
                let text = encoding
                    .decode_without_bom_handling_and_without_replacement(&data[bom..])
                    .ok_or_else(|| {
                        NcbiError::XmlError(format!("malformed {} input", encoding.name()))
                    })?;
                Self::build(Reader::from_str(&text))
            }
            _ => Self::build(Reader::from_reader(data)),
        }
    }

    fn build(mut reader: Reader<&[u8]>) -> Result<Self> {
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                NcbiError::XmlError(format!("at position {}: {e}", reader.buffer_position()))
            })?;
            let decoder = reader.decoder();

            match event {
                Event::Start(e) => stack.push(element_from_start(&e, decoder)?),
                Event::Empty(e) => {
                    let element = element_from_start(&e, decoder)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        NcbiError::XmlError("closing tag without an open element".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(decode_escaped(decoder, &e)?);
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(decode(decoder, &e)?.into_owned());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(NcbiError::XmlError(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }

        let root =
            root.ok_or_else(|| NcbiError::XmlError("document has no root element".to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn decode<'b>(decoder: Decoder, bytes: &'b [u8]) -> Result<Cow<'b, str>> {
    decoder
        .decode(bytes)
        .map_err(|e| NcbiError::XmlError(format!("undecodable text: {e}")))
}

/// Decoded and unescaped content; unresolvable entities stay as written
fn decode_escaped(decoder: Decoder, bytes: &[u8]) -> Result<String> {
    let decoded = decode(decoder, bytes)?;
    match unescape(&decoded) {
        Ok(text) => Ok(text.into_owned()),
        Err(err) => {
            debug!(error = %err, "Keeping raw text for unresolvable entity");
            Ok(decoded.into_owned())
        }
    }
}

fn element_from_start(start: &BytesStart<'_>, decoder: Decoder) -> Result<Element> {
    let name = decode(decoder, start.name().as_ref())?.into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| NcbiError::XmlError(format!("in <{name}>: {e}")))?;
        let key = decode(decoder, attr.key.as_ref())?.into_owned();
        let value = decode_escaped(decoder, &attr.value)?;
        attributes.push((key, value));
    }

    Ok(Element::new(name, attributes))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.nodes.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(NcbiError::XmlError(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

fn compile(path: &str) -> Option<ElementPath> {
    match ElementPath::parse(path) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed path expression");
            None
        }
    }
}

/// All elements matching `path`, possibly empty
pub fn find_all<'a>(element: &'a Element, path: &str) -> Vec<&'a Element> {
    compile(path)
        .map(|compiled| compiled.select(element))
        .unwrap_or_default()
}

/// First element matching `path`, or `None` when nothing matches
pub fn find_safe<'a>(element: &'a Element, path: &str) -> Option<&'a Element> {
    compile(path)?.select_first(element)
}

/// Leading text of the first element matching `path`
pub fn text_safe(element: &Element, path: &str) -> Option<String> {
    find_safe(element, path)?.text().map(str::to_string)
}

/// All descendant text of `element` with whitespace runs collapsed
///
/// Markup such as `<i>`, `<sup>` or MathML is dropped; only its text survives.
pub fn collect_element_text(element: &Element) -> String {
    let mut raw = String::new();
    element.collect_text_into(&mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`collect_element_text`] prefixed by `"<attribute value>: "` when the
/// attribute is present and non-empty
pub fn collect_element_text_with_prefix(element: &Element, attribute: &str) -> String {
    let text = collect_element_text(element);
    match element.get(attribute) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}: {text}"),
        _ => text,
    }
}
