//! Header Name Extractor: finds the line most likely to be the candidate's name.
//!
//! Regions are searched running-header first, then body. Within a region:
//! 1. a heading-styled paragraph among the first 5
//! 2. the first plausible line among the first 10 paragraph lines
//! 3. the first cell of the first table

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{Block, Document, Region};
use crate::parsing::sections::matches_section_keyword;

const MAX_NAME_CHARS: usize = 50;
const HEADING_SCAN_PARAGRAPHS: usize = 5;
const LINE_SCAN_LINES: usize = 10;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\(?\d{1,4}\)?[\s.\-]?\d{2,4}[\s.\-]?\d{3,4}").expect("valid phone regex"));
static STREET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s+[A-Za-z]").expect("valid street regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?://|www\.)|https?://").expect("valid url regex"));

/// True when the line reads like contact data rather than a name.
pub fn looks_like_contact(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.contains('@')
        || PHONE_RE.is_match(line)
        || STREET_RE.is_match(line)
        || URL_RE.is_match(line)
        || lower.contains("linkedin")
        || lower.contains("github")
}

fn plausible_length(text: &str) -> bool {
    let len = text.chars().count();
    len > 1 && len < MAX_NAME_CHARS
}

pub fn extract_name(document: &Document) -> Option<String> {
    [Region::Header, Region::Body]
        .into_iter()
        .find_map(|region| extract_from_region(document.blocks(region)))
}

fn extract_from_region(blocks: &[Block]) -> Option<String> {
    heading_candidate(blocks)
        .or_else(|| line_candidate(blocks))
        .or_else(|| table_candidate(blocks))
}

fn heading_candidate(blocks: &[Block]) -> Option<String> {
    blocks
        .iter()
        .filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
        .take(HEADING_SCAN_PARAGRAPHS)
        .filter(|p| p.heading.is_heading())
        .map(|p| p.text.text().trim().to_string())
        .find(|text| {
            !text.is_empty()
                && text.chars().count() < MAX_NAME_CHARS
                && !matches_section_keyword(text)
        })
}

fn line_candidate(blocks: &[Block]) -> Option<String> {
    blocks
        .iter()
        .filter_map(|b| match b {
            Block::Paragraph(p) => Some(p.text.text()),
            _ => None,
        })
        .flat_map(|text| {
            text.split(['\n', '\r', '\u{000B}'])
                .map(|line| line.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|line| !line.is_empty())
        .take(LINE_SCAN_LINES)
        .find(|line| {
            plausible_length(line) && !matches_section_keyword(line) && !looks_like_contact(line)
        })
}

fn table_candidate(blocks: &[Block]) -> Option<String> {
    let table = blocks.iter().find_map(|b| match b {
        Block::Table(t) => Some(t),
        _ => None,
    })?;
    let first = table.rows.first()?.first()?.text().trim().to_string();
    (plausible_length(&first) && !matches_section_keyword(&first) && !first.contains('@'))
        .then_some(first)
}
