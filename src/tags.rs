//! Tag pattern matching: `@(SPEC|CODE|TEST|DOC):DOMAIN-NNN`.
//!
//! Matching is case-sensitive. The domain is upper-case letters, digits and
//! hyphens; the sequence is always exactly three digits. Text around a tag is
//! irrelevant, so tags are found inside any comment syntax or prose.

use crate::enums::TagKind;
use crate::types::{Tag, TagMap};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// The tag wire format, with the kind, domain and sequence captured.
pub const TAG_PATTERN: &str = r"@(SPEC|CODE|TEST|DOC):([A-Z0-9-]+)-(\d{3})";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(TAG_PATTERN).unwrap());

static WHOLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}$", TAG_PATTERN)).unwrap());

/// A tag found in text, with its byte span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagMatch {
    pub tag: Tag,
    pub start: usize,
    pub end: usize,
}

fn tag_from_captures(caps: &regex::Captures<'_>) -> Option<Tag> {
    let kind = TagKind::from_str(caps.get(1)?.as_str())?;
    let domain = caps.get(2)?.as_str();
    let sequence = caps.get(3)?.as_str().parse().ok()?;
    Some(Tag::new(kind, domain, sequence))
}

/// All tag occurrences in `text`, in order.
pub fn find_tags(text: &str) -> Vec<TagMatch> {
    TAG_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let tag = tag_from_captures(&caps)?;
            Some(TagMatch {
                tag,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Tags in `text` grouped by kind. Repeated tags are kept.
pub fn extract_tags(text: &str) -> TagMap {
    let mut map = TagMap::default();
    for m in find_tags(text) {
        map.push(m.tag);
    }
    map
}

/// Parses a string that is exactly one tag, e.g. `@CODE:AUTH-001`.
pub fn parse_tag(s: &str) -> Option<Tag> {
    let caps = WHOLE_TAG_RE.captures(s.trim())?;
    tag_from_captures(&caps)
}

/// Number of literal occurrences of each tag string, for tags seen at least once.
pub fn count_occurrences(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for m in find_tags(text) {
        *counts.entry(m.tag.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Tag strings occurring more than once, in order of first appearance.
pub fn duplicated_tags(text: &str) -> Vec<String> {
    let counts = count_occurrences(text);
    let mut seen = Vec::new();
    for m in find_tags(text) {
        let literal = m.tag.to_string();
        if counts.get(&literal).copied().unwrap_or(0) > 1 && !seen.contains(&literal) {
            seen.push(literal);
        }
    }
    seen
}

/// True if `text` declares `tag` itself.
///
/// `@CODE:AUTH-001-002` (domain `AUTH-001`) does not declare `@CODE:AUTH-001`
/// even though it contains that text.
pub fn contains_tag(text: &str, tag: &Tag) -> bool {
    find_tags(text).iter().any(|m| m.tag == *tag)
}

/// Byte spans of every occurrence of `tag` in `text`.
pub fn tag_spans(text: &str, tag: &Tag) -> Vec<(usize, usize)> {
    find_tags(text)
        .into_iter()
        .filter(|m| m.tag == *tag)
        .map(|m| (m.start, m.end))
        .collect()
}
