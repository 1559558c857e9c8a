//! Messages, placeholders, and per-locale bundles.
//!
//! Everything here is a plain value with no shared mutable state. A `Bundle`
//! is produced by a codec's read path and handed to exactly one transform
//! invocation, which discards it when the locale's pass completes.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::locale::Locale;

/// An opaque, untranslatable fragment of message content: a markup snippet
/// such as `<b>` or the source of an interpolated expression such as
/// `${user.name}`. The payload is reproduced byte-for-byte in every
/// translation; only its position among the text runs may move.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub untranslatable: String,
}

impl Placeholder {
    pub fn new(untranslatable: impl Into<String>) -> Self {
        Placeholder {
            untranslatable: untranslatable.into(),
        }
    }
}

/// One element of message content. Order defines rendering order. Adjacent
/// text runs may be merged or split freely; a placeholder never merges with
/// a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Placeholder(Placeholder),
}

impl Content {
    pub fn text(value: impl Into<String>) -> Self {
        Content::Text(value.into())
    }

    pub fn placeholder(untranslatable: impl Into<String>) -> Self {
        Content::Placeholder(Placeholder::new(untranslatable))
    }
}

/// A message as extracted from application source by the analysis step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMessage {
    /// The stable identifier: an explicit author override when one was
    /// given, otherwise derived from the content shape (see [`crate::messages::digest`]).
    pub name: String,
    pub contents: Vec<Content>,
    /// Whether the message may contain markup placeholders, as opposed to
    /// being a plain string.
    pub is_rich: bool,
    /// Nested human-readable context labels for translators, outermost
    /// first.
    pub desc_stack: Vec<String>,
}

impl ProgramMessage {
    /// The translator-facing note: the description stack joined with " / ".
    pub fn desc(&self) -> Option<String> {
        if self.desc_stack.is_empty() {
            None
        } else {
            Some(self.desc_stack.join(" / "))
        }
    }
}

/// A message as found in a translation bundle. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub contents: Vec<Content>,
}

impl Message {
    /// All placeholder payloads in content order.
    pub fn placeholder_payloads(&self) -> Vec<&str> {
        self.contents
            .iter()
            .filter_map(|c| match c {
                Content::Placeholder(ph) => Some(ph.untranslatable.as_str()),
                Content::Text(_) => None,
            })
            .collect()
    }
}

/// One locale's complete set of translated messages.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub locale: Locale,
    pub messages: Vec<Message>,
}

/// Name-keyed message lookup for O(1) access during re-injection.
pub type MessageIndex = IndexMap<String, Message>;

/// Builds the name -> message index for a bundle's messages.
///
/// Duplicate policy: the first occurrence of a name wins; later duplicates
/// are dropped with a warning. Messages with an empty name are rejected.
pub fn make_message_index(messages: Vec<Message>) -> Result<MessageIndex> {
    let mut index = MessageIndex::new();
    for message in messages {
        if message.name.is_empty() {
            return Err(Error::EmptyMessageName);
        }
        if index.contains_key(&message.name) {
            log::warn!(
                "duplicate message {:?} in bundle; keeping the first occurrence",
                message.name
            );
            continue;
        }
        index.insert(message.name.clone(), message);
    }
    Ok(index)
}
