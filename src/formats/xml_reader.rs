//! XML read-side document tree.
//!
//! The codecs reconstruct bundles by walking a small document tree rather
//! than the raw event stream, because the unit-content rules (exactly one
//! text child per placeholder, no foreign node kinds inside a unit) are
//! much easier to enforce on a tree. The tree is built from a `quick-xml`
//! event reader; text is unescaped during the walk.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    /// Comments, CDATA sections, and processing instructions. They are
    /// tolerated between structural elements and fatal inside unit content.
    Foreign(&'static str),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child_elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter_map(move |child| match child {
            XmlNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }
}

/// Whether a text node is pure inter-element whitespace (ignorable at
/// structural levels, meaningful inside unit content).
pub fn is_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Parses one XML document and returns its root element.
///
/// A document with no root element, or with more than one top-level
/// element, is a fatal parse error identifying `path`.
pub fn parse_document(text: &str, path: &Path) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::corrupt(path, e.to_string()))?;
        match event {
            Event::Start(start) => {
                let element = open_element(&start, path)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&start, path)?;
                close_element(element, &mut stack, &mut root, path)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::corrupt(path, "unbalanced closing tag"))?;
                close_element(element, &mut stack, &mut root, path)?;
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| Error::corrupt(path, e.to_string()))?
                    .into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(value)),
                    // Whitespace between the declaration and the root is fine.
                    None if is_whitespace(&value) => {}
                    None => {
                        return Err(Error::corrupt(path, "text content outside the root element"))
                    }
                }
            }
            Event::CData(_) => push_foreign("CDATA section", &mut stack),
            Event::Comment(_) => push_foreign("comment", &mut stack),
            Event::PI(_) => push_foreign("processing instruction", &mut stack),
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(Error::corrupt(path, "unexpected end of document"));
    }
    root.ok_or_else(|| Error::corrupt(path, "document has no root element"))
}

fn open_element(start: &quick_xml::events::BytesStart<'_>, path: &Path) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::corrupt(path, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::corrupt(path, e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn close_element(
    element: Element,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    path: &Path,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_some() {
                return Err(Error::corrupt(path, "more than one top-level element"));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn push_foreign(kind: &'static str, stack: &mut [Element]) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Foreign(kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(text: &str) -> Result<Element> {
        parse_document(text, &PathBuf::from("test.xml"))
    }

    #[test]
    fn parses_nested_elements_and_unescapes_text() {
        let root = parse(r#"<a x="1"><b>two &lt;3&gt;</b></a>"#).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1"));
        let b = root.child_elements("b").next().unwrap();
        match &b.children[0] {
            XmlNode::Text(t) => assert_eq!(t, "two <3>"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn rejects_multiple_roots() {
        let err = parse("<a/><b/>").unwrap_err();
        assert!(err.to_string().contains("more than one top-level element"));
    }

    #[test]
    fn rejects_empty_documents() {
        assert!(parse("  \n ").is_err());
    }

    #[test]
    fn preserves_comments_as_foreign_nodes() {
        let root = parse("<a><!-- hi --></a>").unwrap();
        assert!(matches!(root.children[0], XmlNode::Foreign("comment")));
    }
}
