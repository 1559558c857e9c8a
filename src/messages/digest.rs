//! Stable message identifiers.
//!
//! The identifier is a deterministic function of a message's content shape
//! and its richness flag, so translations survive source refactors that do
//! not change the visible text. Content pieces (text runs and placeholder
//! payloads, in order) are joined with the unit separator control character
//! and hashed with 64-bit FNV-1a over UTF-16 code units; the id is the hash
//! in base 36 prefixed with `h` for rich (markup-capable) messages or `s`
//! for plain strings.
//!
//! WARNING: this is a fingerprint, not a cryptographic hash.

use crate::messages::message::Content;

/// Joins content pieces so that `["ab", "c"]` and `["a", "bc"]` hash
/// differently.
const HASH_DELIMITER: &str = "\u{1e}";

const FNV1A_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV1A_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Computes the stable identifier for a message with the given content
/// shape.
pub fn message_id(contents: &[Content], is_rich: bool) -> String {
    let pieces: Vec<&str> = contents
        .iter()
        .map(|c| match c {
            Content::Text(text) => text.as_str(),
            Content::Placeholder(ph) => ph.untranslatable.as_str(),
        })
        .collect();
    let prefix = if is_rich { 'h' } else { 's' };
    format!("{}{}", prefix, to_base36(fnv1a64(&pieces.join(HASH_DELIMITER))))
}

/// 64-bit FNV-1a over the UTF-16 code units of `text`.
///
/// Code units rather than bytes keep the ids identical to the ones computed
/// by the runtime library, which hashes JavaScript strings directly.
fn fnv1a64(text: &str) -> u64 {
    let mut hash = FNV1A_OFFSET;
    for unit in text.encode_utf16() {
        hash ^= u64::from(unit);
        hash = hash.wrapping_mul(FNV1A_PRIME);
    }
    hash
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.iter().rev().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::message::Content;

    #[test]
    fn plain_and_rich_ids_differ() {
        let contents = vec![Content::text("Hello World")];
        let plain = message_id(&contents, false);
        let rich = message_id(&contents, true);
        assert!(plain.starts_with('s'));
        assert!(rich.starts_with('h'));
        assert_eq!(plain[1..], rich[1..]);
    }

    #[test]
    fn segmentation_affects_the_id() {
        let one = vec![Content::text("ab"), Content::placeholder("c")];
        let other = vec![Content::text("a"), Content::placeholder("bc")];
        assert_ne!(message_id(&one, false), message_id(&other, false));
    }

    #[test]
    fn identical_shapes_share_an_id() {
        let make = || {
            vec![
                Content::text("Hello "),
                Content::placeholder("<b>"),
                Content::text("World"),
                Content::placeholder("</b>"),
            ]
        };
        assert_eq!(message_id(&make(), true), message_id(&make(), true));
    }

    #[test]
    fn base36_renders_expected_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn non_ascii_text_hashes_by_code_unit() {
        // A supplementary-plane character contributes two UTF-16 code units.
        let emoji = vec![Content::text("\u{1F600}")];
        let id = message_id(&emoji, false);
        assert!(id.starts_with('s') && id.len() > 1);
    }
}
