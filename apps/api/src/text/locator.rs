//! Fuzzy Locator: finds where a free-text string (typically copied by an LLM) lives
//! inside one element's text.
//!
//! Strategies, first hit wins:
//! 1. exact literal substring
//! 2. whole-element equality after normalization
//! 3. normalized containment
//! 4. normalized containment of the first 50 characters (only for strings > 50 chars)
//!
//! Edits operate on real offsets, so strategies 3 and 4 re-anchor onto the
//! unnormalized text before returning.

use serde::{Deserialize, Serialize};

use crate::text::normalize::{normalize, normalize_with_map};

/// Characters used to re-anchor the start and end of a normalized match.
const ANCHOR_CHARS: usize = 30;
/// Prefix length tried by the truncation-tolerant strategy.
const PARTIAL_PREFIX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Contains,
    Partial,
}

/// A located span in character offsets, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Located {
    pub kind: MatchKind,
    pub start: usize,
    pub end: usize,
}

/// Locates `search` inside `document_text`. `None` means "needs manual handling".
pub fn locate(search: &str, document_text: &str) -> Option<Located> {
    if search.trim().is_empty() {
        return None;
    }
    let doc_len = char_len(document_text);

    if let Some(start) = find_chars(document_text, search, 0) {
        return Some(Located {
            kind: MatchKind::Exact,
            start,
            end: start + char_len(search),
        });
    }

    let (norm_doc, map) = normalize_with_map(document_text);
    let norm_search = normalize(search);
    if norm_search.is_empty() {
        return None;
    }

    if norm_doc == norm_search {
        return Some(Located {
            kind: MatchKind::Exact,
            start: 0,
            end: doc_len,
        });
    }

    if let Some(norm_start) = find_chars(&norm_doc, &norm_search, 0) {
        let norm_end = norm_start + char_len(&norm_search);
        let mapped_end = map.get(norm_end - 1).map(|&i| i + 1);
        return anchor(search, document_text, map.get(norm_start).copied(), mapped_end)
            .map(|(start, end)| Located {
                kind: MatchKind::Contains,
                start,
                end,
            });
    }

    if char_len(search) > PARTIAL_PREFIX_CHARS {
        let norm_prefix = normalize(&take_chars(search, PARTIAL_PREFIX_CHARS));
        if let Some(norm_start) = find_chars(&norm_doc, &norm_prefix, 0) {
            return anchor(search, document_text, map.get(norm_start).copied(), None).map(
                |(start, end)| Located {
                    kind: MatchKind::Partial,
                    start,
                    end,
                },
            );
        }
    }

    None
}

/// Resolves real offsets for a normalized hit.
///
/// Start: the literal first 30 chars of `search`, falling back to the normalized
/// position mapped back to the original text. End: the literal last 30 chars found
/// after the start, else the mapped normalized end, else `start + len(search)`
/// clamped to the element.
fn anchor(
    search: &str,
    document_text: &str,
    mapped_start: Option<usize>,
    mapped_end: Option<usize>,
) -> Option<(usize, usize)> {
    let doc_len = char_len(document_text);
    let head = take_chars(search, ANCHOR_CHARS);
    let start = find_chars(document_text, &head, 0).or(mapped_start)?;

    let search_len = char_len(search);
    let tail = take_last_chars(search, ANCHOR_CHARS);
    let end = find_chars(document_text, &tail, start)
        .map(|pos| pos + char_len(&tail))
        .or(mapped_end.filter(|&e| e > start))
        .unwrap_or_else(|| (start + search_len).min(doc_len));

    (end > start).then_some((start, end))
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Character offset of the first literal `needle` at or after char offset `from`.
pub fn find_chars(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let from_byte = crate::document::rich_text::byte_index(haystack, from);
    haystack[from_byte..]
        .find(needle)
        .map(|b| from + haystack[from_byte..from_byte + b].chars().count())
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn take_last_chars(s: &str, n: usize) -> String {
    let skip = char_len(s).saturating_sub(n);
    s.chars().skip(skip).collect()
}
