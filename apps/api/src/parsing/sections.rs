//! Structural Parser: folds a document body into a Section Model.
//!
//! One linear pass over the top-level blocks. The accumulator carries the current
//! section name; nothing is kept between calls, so every parse starts from scratch
//! on the live document.

use serde::{Deserialize, Serialize};

use crate::document::{Block, Document, HeadingStyle};

/// Implicit section holding everything before the first detected header.
pub const HEADER_SECTION: &str = "Header";

/// Section keywords, matched as case-insensitive substrings.
pub const SECTION_KEYWORDS: &[&str] = &[
    "EXPERIENCE",
    "EMPLOYMENT",
    "WORK HISTORY",
    "SKILLS",
    "EDUCATION",
    "PROJECTS",
    "CERTIFICATIONS",
    "AWARDS",
    "HONORS",
    "ACHIEVEMENTS",
    "SUMMARY",
    "PROFILE",
    "OBJECTIVE",
    "PUBLICATIONS",
    "VOLUNTEER",
    "LEADERSHIP",
    "LANGUAGES",
    "INTERESTS",
    "COURSEWORK",
    "REFERENCES",
];

pub fn matches_section_keyword(text: &str) -> bool {
    let upper = text.to_uppercase();
    SECTION_KEYWORDS.iter().any(|k| upper.contains(k))
}

/// Independent reasons a paragraph may be a section header. Combined with OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderSignal {
    HeadingStyle,
    AllCaps,
    Keyword,
}

/// Every header signal present for a paragraph with the given text and style.
pub fn header_signals(text: &str, heading: HeadingStyle) -> Vec<HeaderSignal> {
    let text = text.trim();
    let mut signals = Vec::new();
    if heading.is_heading() {
        signals.push(HeaderSignal::HeadingStyle);
    }
    if text.chars().count() > 3 && text == text.to_uppercase() {
        signals.push(HeaderSignal::AllCaps);
    }
    if matches_section_keyword(text) {
        signals.push(HeaderSignal::Keyword);
    }
    signals
}

pub fn is_header(text: &str, heading: HeadingStyle) -> bool {
    !header_signals(text, heading).is_empty()
}

/// Trims colons, hyphens, dashes, and whitespace from both ends of a header line.
pub fn normalize_section_name(text: &str) -> String {
    text.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, ':' | '-' | '\u{2013}' | '\u{2014}')
    })
    .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Paragraph,
    ListItem,
    Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub content: String,
    /// Index into the body's top-level block sequence.
    pub source_position: usize,
    pub nesting_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub items: Vec<ContentItem>,
}

/// One top-level block in document order, tagged with the section it was read under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEntry {
    pub kind: ContentKind,
    pub text: String,
    pub source_position: usize,
    pub section: String,
    pub is_header: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionModel {
    /// Sections in first-seen order. Serialized as a `name -> items` object in that order.
    #[serde(with = "ordered_sections")]
    pub sections: Vec<Section>,
    pub elements: Vec<ElementEntry>,
}

mod ordered_sections {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};

    use super::{ContentItem, Section};

    pub fn serialize<S>(sections: &[Section], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(sections.iter().map(|s| (&s.name, &s.items)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Section>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SectionsVisitor)
    }

    struct SectionsVisitor;

    impl<'de> Visitor<'de> for SectionsVisitor {
        type Value = Vec<Section>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of section name to content items")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sections = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, items)) = map.next_entry::<String, Vec<ContentItem>>()? {
                sections.push(Section { name, items });
            }
            Ok(sections)
        }
    }
}

impl SectionModel {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn content_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    fn bucket(&mut self, name: &str) -> &mut Vec<ContentItem> {
        let idx = match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    items: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx].items
    }
}

/// Fold accumulator.
struct ParseState {
    current_section: String,
    model: SectionModel,
}

impl ParseState {
    fn new() -> Self {
        let mut model = SectionModel {
            sections: Vec::new(),
            elements: Vec::new(),
        };
        model.bucket(HEADER_SECTION);
        Self {
            current_section: HEADER_SECTION.to_string(),
            model,
        }
    }

    fn visit(mut self, position: usize, block: &Block) -> Self {
        let (kind, text, is_header, nesting_level) = match block {
            Block::Paragraph(p) => {
                let text = p.text.text().trim().to_string();
                let header = !text.is_empty() && is_header(&text, p.heading);
                (ContentKind::Paragraph, text, header, 0)
            }
            Block::ListItem(li) => (
                ContentKind::ListItem,
                li.text.text().trim().to_string(),
                false,
                li.nesting_level,
            ),
            Block::Table(t) => (ContentKind::Table, t.flatten(), false, 0),
        };

        if is_header {
            self.current_section = normalize_section_name(&text);
            let name = self.current_section.clone();
            self.model.bucket(&name);
        } else if !text.is_empty() {
            let name = self.current_section.clone();
            self.model.bucket(&name).push(ContentItem {
                kind,
                content: text.clone(),
                source_position: position,
                nesting_level,
            });
        }

        self.model.elements.push(ElementEntry {
            kind,
            text,
            source_position: position,
            section: self.current_section.clone(),
            is_header,
        });
        self
    }
}

/// Parses the document body into a Section Model.
pub fn parse(document: &Document) -> SectionModel {
    document
        .body
        .iter()
        .enumerate()
        .fold(ParseState::new(), |state, (position, block)| {
            state.visit(position, block)
        })
        .model
}
