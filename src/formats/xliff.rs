//! XLIFF 1.2 interchange codec (format B).
//!
//! One physical file per target locale at `<xliff_dir>/<locale>.xlf`. Each
//! file carries the source units; translators add a `<target>` sibling next
//! to each `<source>` as they work, and units without a `<target>` are
//! simply not translated yet. Placeholders are `<ph id="N">` elements with
//! a zero-based per-unit id.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::formats::xml_helper as xml;
use crate::formats::xml_reader::{self, Element, XmlNode};
use crate::formats::{parse_unit_contents, write_interchange_file, Formatter};
use crate::locale::Locale;
use crate::messages::{Bundle, Content, Message, ProgramMessage};

const VERSION: &str = "1.2";
const XMLNS: &str = "urn:oasis:names:tc:xliff:document:1.2";
const ORIGINAL: &str = "localize-compiler";
const DATATYPE: &str = "plaintext";

const XLIFF_TAG: &str = "xliff";
const FILE_TAG: &str = "file";
const BODY_TAG: &str = "body";
const UNIT_TAG: &str = "trans-unit";
const NOTE_TAG: &str = "note";
const SOURCE_TAG: &str = "source";
const TARGET_TAG: &str = "target";
const PLACEHOLDER_TAG: &str = "ph";

pub struct XliffFormatter {
    source_locale: Locale,
    target_locales: Vec<Locale>,
    xliff_dir: PathBuf,
}

impl XliffFormatter {
    pub fn new(source_locale: Locale, target_locales: Vec<Locale>, xliff_dir: PathBuf) -> Self {
        XliffFormatter {
            source_locale,
            target_locales,
            xliff_dir,
        }
    }

    fn locale_path(&self, locale: &Locale) -> PathBuf {
        self.xliff_dir.join(format!("{locale}.xlf"))
    }

    /// Serializes the source messages into one XLIFF document addressed to
    /// `target`.
    pub fn serialize_source_messages(
        &self,
        target: &Locale,
        messages: &[ProgramMessage],
    ) -> String {
        let mut body = xml::Tag::new(BODY_TAG);
        for message in messages {
            let mut unit = xml::Tag::new(UNIT_TAG).attr("id", &message.name);
            if let Some(desc) = message.desc() {
                unit = unit
                    .child(xml::Node::Cr(4))
                    .child(xml::Tag::new(NOTE_TAG).text_child(desc).into_node());
            }
            let mut source = xml::Tag::new(SOURCE_TAG);
            let mut next_ph_id = 0usize;
            for content in &message.contents {
                source = source.child(content_node(content, &mut next_ph_id));
            }
            unit = unit
                .child(xml::Node::Cr(4))
                .child(source.into_node())
                .child(xml::Node::Cr(3));
            body = body.child(xml::Node::Cr(3)).child(unit.into_node());
        }
        if !messages.is_empty() {
            body = body.child(xml::Node::Cr(2));
        }

        let file = xml::Tag::new(FILE_TAG)
            .attr("target-language", target.as_str())
            .attr("source-language", self.source_locale.as_str())
            .attr("original", ORIGINAL)
            .attr("datatype", DATATYPE)
            .child(xml::Node::Cr(2))
            .child(body.into_node())
            .child(xml::Node::Cr(1));
        let xliff = xml::Tag::new(XLIFF_TAG)
            .attr("version", VERSION)
            .attr("xmlns", XMLNS)
            .child(xml::Node::Cr(1))
            .child(file.into_node())
            .child(xml::Node::Cr(0));

        xml::serialize(&[
            xml::Node::Declaration(xml::Declaration::standard()),
            xml::Node::Cr(0),
            xliff.into_node(),
        ])
    }

    /// Parses one XLIFF document into exactly one bundle. Units without a
    /// `<target>` are skipped as "not yet translated".
    pub fn parse_bundle(&self, text: &str, path: &Path) -> Result<Bundle> {
        let root = xml_reader::parse_document(text, path)?;
        if root.name != XLIFF_TAG {
            return Err(Error::corrupt(
                path,
                format!("expected <{XLIFF_TAG}> root element, found <{}>", root.name),
            ));
        }
        let file = exactly_one_child(&root, FILE_TAG, path)?;
        let locale_code = file.attr("target-language").ok_or_else(|| {
            Error::corrupt(
                path,
                format!("<{FILE_TAG}> is missing the target-language attribute"),
            )
        })?;
        let locale = Locale::new(locale_code)
            .map_err(|_| Error::corrupt(path, format!("invalid locale code {locale_code:?}")))?;
        let body = exactly_one_child(file, BODY_TAG, path)?;

        let mut messages = Vec::new();
        for child in &body.children {
            match child {
                XmlNode::Text(text) if xml_reader::is_whitespace(text) => {}
                XmlNode::Text(_) => {
                    return Err(Error::corrupt(
                        path,
                        format!("unexpected text content inside <{BODY_TAG}>"),
                    ))
                }
                XmlNode::Element(el) if el.name == UNIT_TAG => {
                    let id = el.attr("id").ok_or_else(|| {
                        Error::corrupt(path, format!("<{UNIT_TAG}> is missing the id attribute"))
                    })?;
                    let mut targets = el.child_elements(TARGET_TAG);
                    let target = match (targets.next(), targets.next()) {
                        (None, _) => continue, // not yet translated
                        (Some(target), None) => target,
                        (Some(_), Some(_)) => {
                            return Err(Error::corrupt(
                                path,
                                format!("unit {id:?} has more than one <{TARGET_TAG}>"),
                            ))
                        }
                    };
                    let contents =
                        parse_unit_contents(&target.children, PLACEHOLDER_TAG, id, path)?;
                    messages.push(Message {
                        name: id.to_string(),
                        contents,
                    });
                }
                XmlNode::Element(el) => {
                    return Err(Error::corrupt(
                        path,
                        format!("unexpected <{}> inside <{BODY_TAG}>", el.name),
                    ))
                }
                XmlNode::Foreign(_) => {}
            }
        }
        Ok(Bundle { locale, messages })
    }
}

fn exactly_one_child<'a>(parent: &'a Element, name: &'a str, path: &Path) -> Result<&'a Element> {
    let mut matches = parent.child_elements(name);
    match (matches.next(), matches.next()) {
        (Some(el), None) => Ok(el),
        (None, _) => Err(Error::corrupt(path, format!("missing <{name}> element"))),
        (Some(_), Some(_)) => Err(Error::corrupt(
            path,
            format!("more than one <{name}> element"),
        )),
    }
}

fn content_node(content: &Content, next_ph_id: &mut usize) -> xml::Node {
    match content {
        Content::Text(text) => xml::Node::Text(xml::Text::new(text.clone())),
        Content::Placeholder(ph) => {
            let id = *next_ph_id;
            *next_ph_id += 1;
            xml::Tag::new(PLACEHOLDER_TAG)
                .attr("id", id.to_string())
                .text_child(ph.untranslatable.clone())
                .into_node()
        }
    }
}

impl Formatter for XliffFormatter {
    fn write_output(&self, messages: &[ProgramMessage]) -> Result<()> {
        // One write task per target locale; a failure on one locale must not
        // prevent the attempts for the others, but the overall operation
        // still fails if any attempt failed.
        let results: Vec<Result<()>> = self
            .target_locales
            .par_iter()
            .map(|locale| {
                let document = self.serialize_source_messages(locale, messages);
                write_interchange_file(&self.locale_path(locale), &document)
            })
            .collect();
        results.into_iter().collect()
    }

    fn read_bundles(&self) -> Result<Vec<Bundle>> {
        let results: Vec<Result<Option<Bundle>>> = self
            .target_locales
            .par_iter()
            .map(|locale| {
                let path = self.locale_path(locale);
                let text = match std::fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        log::debug!("no translations yet for {locale} ({})", path.display());
                        return Ok(None);
                    }
                    Err(source) => {
                        return Err(Error::Read {
                            path: path.clone(),
                            source,
                        })
                    }
                };
                let bundle = self.parse_bundle(&text, &path)?;
                if bundle.locale != *locale {
                    log::warn!(
                        "{}: declares target-language {:?}, expected {:?}; using the declared locale",
                        path.display(),
                        bundle.locale.as_str(),
                        locale.as_str()
                    );
                }
                Ok(Some(bundle))
            })
            .collect();
        let mut bundles = Vec::new();
        for result in results {
            if let Some(bundle) = result? {
                bundles.push(bundle);
            }
        }
        Ok(bundles)
    }
}
