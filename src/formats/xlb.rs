//! XLB interchange codec (format A).
//!
//! One physical file holds one `<bundle locale="…">` element whose
//! `<msg name="…" [desc="…"]>` units carry translated content directly.
//! The write path emits a single file of source-locale messages; the read
//! path loads every file matched by the configured glob, each yielding one
//! bundle, with no per-target-locale filtering.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::formats::xml_helper as xml;
use crate::formats::xml_reader::{self, XmlNode};
use crate::formats::{
    parse_unit_contents, read_interchange_file, write_interchange_file, Formatter,
};
use crate::locale::Locale;
use crate::messages::{Bundle, Content, Message, ProgramMessage};

const BUNDLE_TAG: &str = "bundle";
const MSG_TAG: &str = "msg";
const PLACEHOLDER_TAG: &str = "ph";

pub struct XlbFormatter {
    source_locale: Locale,
    output_file: PathBuf,
    translations_glob: String,
}

impl XlbFormatter {
    pub fn new(source_locale: Locale, output_file: PathBuf, translations_glob: String) -> Self {
        XlbFormatter {
            source_locale,
            output_file,
            translations_glob,
        }
    }

    /// Serializes the extracted source messages into one XLB document.
    pub fn serialize_source_messages(&self, messages: &[ProgramMessage]) -> String {
        let mut bundle = xml::Tag::new(BUNDLE_TAG).attr("locale", self.source_locale.as_str());
        for message in messages {
            let mut msg = xml::Tag::new(MSG_TAG).attr("name", &message.name);
            if let Some(desc) = message.desc() {
                msg = msg.attr("desc", desc);
            }
            msg = msg.children(message.contents.iter().map(content_node));
            bundle = bundle.child(xml::Node::Cr(1)).child(msg.into_node());
        }
        if !messages.is_empty() {
            bundle = bundle.child(xml::Node::Cr(0));
        }
        xml::serialize(&[
            xml::Node::Declaration(xml::Declaration::standard()),
            xml::Node::Cr(0),
            bundle.into_node(),
        ])
    }

    /// Parses one XLB document into exactly one bundle.
    pub fn parse_bundle(&self, text: &str, path: &std::path::Path) -> Result<Bundle> {
        let root = xml_reader::parse_document(text, path)?;
        if root.name != BUNDLE_TAG {
            return Err(Error::corrupt(
                path,
                format!("expected <{BUNDLE_TAG}> root element, found <{}>", root.name),
            ));
        }
        let locale_code = root.attr("locale").ok_or_else(|| {
            Error::corrupt(path, format!("<{BUNDLE_TAG}> is missing the locale attribute"))
        })?;
        let locale = Locale::new(locale_code)
            .map_err(|_| Error::corrupt(path, format!("invalid locale code {locale_code:?}")))?;

        let mut messages = Vec::new();
        for child in &root.children {
            match child {
                XmlNode::Text(text) if xml_reader::is_whitespace(text) => {}
                XmlNode::Text(_) => {
                    return Err(Error::corrupt(
                        path,
                        format!("unexpected text content inside <{BUNDLE_TAG}>"),
                    ))
                }
                XmlNode::Element(el) if el.name == MSG_TAG => {
                    let name = el.attr("name").ok_or_else(|| {
                        Error::corrupt(
                            path,
                            format!("<{MSG_TAG}> is missing the name attribute"),
                        )
                    })?;
                    let contents =
                        parse_unit_contents(&el.children, PLACEHOLDER_TAG, name, path)?;
                    messages.push(Message {
                        name: name.to_string(),
                        contents,
                    });
                }
                XmlNode::Element(el) => {
                    return Err(Error::corrupt(
                        path,
                        format!("unexpected <{}> inside <{BUNDLE_TAG}>", el.name),
                    ))
                }
                XmlNode::Foreign(_) => {}
            }
        }
        Ok(Bundle { locale, messages })
    }
}

fn content_node(content: &Content) -> xml::Node {
    match content {
        Content::Text(text) => xml::Node::Text(xml::Text::new(text.clone())),
        Content::Placeholder(ph) => xml::Tag::new(PLACEHOLDER_TAG)
            .text_child(ph.untranslatable.clone())
            .into_node(),
    }
}

impl Formatter for XlbFormatter {
    fn write_output(&self, messages: &[ProgramMessage]) -> Result<()> {
        let document = self.serialize_source_messages(messages);
        write_interchange_file(&self.output_file, &document)
    }

    fn read_bundles(&self) -> Result<Vec<Bundle>> {
        let entries = glob::glob(&self.translations_glob).map_err(|e| Error::BadGlob {
            pattern: self.translations_glob.clone(),
            message: e.to_string(),
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => {
                    let path = e.path().to_path_buf();
                    return Err(Error::Read {
                        path,
                        source: e.into(),
                    });
                }
            }
        }

        // One read task per file; the first failure wins, remaining results
        // are discarded.
        let results: Vec<Result<Bundle>> = paths
            .par_iter()
            .map(|path| {
                let text = read_interchange_file(path)?;
                self.parse_bundle(&text, path)
            })
            .collect();
        results.into_iter().collect()
    }
}
