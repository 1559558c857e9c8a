//! Interchange codecs.
//!
//! Two structurally parallel formats are supported: XLB (one multi-message
//! bundle element per file, read by glob) and XLIFF 1.2 (one file per
//! target locale). Both convert between the message model and a
//! translator-facing XML representation behind the [`Formatter`] trait.

pub mod xlb;
pub mod xliff;
pub mod xml_helper;
pub mod xml_reader;

use std::fs;
use std::path::Path;

use crate::config::{Config, InterchangeConfig};
use crate::error::{Error, Result};
use crate::messages::{Bundle, Content, ProgramMessage};

use xml_reader::XmlNode;

pub use xlb::XlbFormatter;
pub use xliff::XliffFormatter;

/// One interchange format's read and write paths.
pub trait Formatter {
    /// Emits the interchange file(s) a translator works from.
    fn write_output(&self, messages: &[ProgramMessage]) -> Result<()>;

    /// Reads every available translation bundle. A bundle that simply does
    /// not exist yet is skipped; any other failure is fatal.
    fn read_bundles(&self) -> Result<Vec<Bundle>>;
}

/// Builds the formatter selected by the configuration.
pub fn formatter_for(config: &Config) -> Box<dyn Formatter + Send + Sync> {
    match &config.interchange {
        InterchangeConfig::Xlb {
            output_file,
            translations_glob,
        } => Box::new(XlbFormatter::new(
            config.source_locale.clone(),
            output_file.clone(),
            translations_glob.clone(),
        )),
        InterchangeConfig::Xliff { xliff_dir } => Box::new(XliffFormatter::new(
            config.source_locale.clone(),
            config.target_locales.clone(),
            xliff_dir.clone(),
        )),
    }
}

/// Reconstructs unit content from the children of a translated-content
/// element.
///
/// Text nodes become text runs; `<{ph_tag}>` elements become placeholders
/// and must contain exactly one text child. Anything else inside the unit
/// is a fatal parse error naming the offending unit.
pub(crate) fn parse_unit_contents(
    children: &[XmlNode],
    ph_tag: &str,
    unit_name: &str,
    path: &Path,
) -> Result<Vec<Content>> {
    let mut contents = Vec::new();
    for child in children {
        match child {
            XmlNode::Text(text) => contents.push(Content::text(text.clone())),
            XmlNode::Element(el) if el.name == ph_tag => match el.children.as_slice() {
                [XmlNode::Text(payload)] => contents.push(Content::placeholder(payload.clone())),
                [] => {
                    return Err(Error::corrupt(
                        path,
                        format!("unit {unit_name:?}: placeholder has no text content"),
                    ))
                }
                _ => {
                    return Err(Error::corrupt(
                        path,
                        format!(
                            "unit {unit_name:?}: placeholder must contain exactly one text node"
                        ),
                    ))
                }
            },
            XmlNode::Element(el) => {
                return Err(Error::corrupt(
                    path,
                    format!("unit {unit_name:?}: unexpected <{}> element", el.name),
                ))
            }
            XmlNode::Foreign(kind) => {
                return Err(Error::corrupt(
                    path,
                    format!("unit {unit_name:?}: unexpected {kind}"),
                ))
            }
        }
    }
    Ok(contents)
}

/// Writes an interchange document, creating the destination directory
/// recursively first. I/O failures are wrapped with the attempted path and
/// a permissions hint.
pub(crate) fn write_interchange_file(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    log::debug!("writing interchange file {}", path.display());
    fs::write(path, document).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_interchange_file(path: &Path) -> Result<String> {
    log::debug!("reading interchange file {}", path.display());
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}
