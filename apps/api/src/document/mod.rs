//! Document model: the data contract of the document store.
//!
//! A document has two regions (running header and body), each an ordered sequence of
//! top-level blocks. Paragraphs, list items, and table cells are *text elements*: the
//! units that locating, mutation, and review operate on.

pub mod rich_text;
pub mod snapshot;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use rich_text::{ChangeRole, ChangeTag, PriorMarking, RichText, Run, TextStyle};
pub use snapshot::FormattingSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Header,
    Body,
}

/// Named paragraph style. Anything other than `Normal` counts as a heading style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    #[default]
    Normal,
    Title,
    Subtitle,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
}

impl HeadingStyle {
    pub fn is_heading(self) -> bool {
        self != HeadingStyle::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub heading: HeadingStyle,
    pub text: RichText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub nesting_level: u32,
    pub text: RichText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<RichText>>,
}

impl Table {
    /// Flattens the table as `r1c1 | r1c2\nr2c1 | ...`.
    pub fn flatten(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.text().trim().to_string())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    ListItem(ListItem),
    Table(Table),
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph {
            heading: HeadingStyle::Normal,
            text: RichText::plain(text),
        })
    }

    pub fn heading(text: impl Into<String>, heading: HeadingStyle) -> Self {
        Block::Paragraph(Paragraph {
            heading,
            text: RichText::plain(text),
        })
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Block::Paragraph(Paragraph {
            heading: HeadingStyle::Normal,
            text: RichText::styled(text, style),
        })
    }

    pub fn list_item(text: impl Into<String>, nesting_level: u32) -> Self {
        Block::ListItem(ListItem {
            nesting_level,
            text: RichText::plain(text),
        })
    }

    pub fn table(rows: &[&[&str]]) -> Self {
        Block::Table(Table {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| RichText::plain(*c)).collect())
                .collect(),
        })
    }

    /// Plain text of the block; tables are flattened.
    pub fn text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.text.text(),
            Block::ListItem(li) => li.text.text(),
            Block::Table(t) => t.flatten(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// Address of a single text element inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub region: Region,
    pub block: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellRef>,
}

/// A literal text hit: `end_inclusive` follows the document store contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMatch {
    pub element: ElementRef,
    pub start: usize,
    pub end_inclusive: usize,
}

impl TextMatch {
    pub fn end(&self) -> usize {
        self.end_inclusive + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub header: Vec<Block>,
    #[serde(default)]
    pub body: Vec<Block>,
}

impl Document {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder: None,
            modified_at: Utc::now(),
            header: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<Block>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, header: Vec<Block>) -> Self {
        self.header = header;
        self
    }

    pub fn blocks(&self, region: Region) -> &[Block] {
        match region {
            Region::Header => &self.header,
            Region::Body => &self.body,
        }
    }

    /// Every text element in search order: body first, then the running header.
    /// Table cells are visited row-major.
    pub fn text_elements(&self) -> Vec<ElementRef> {
        let mut elements = Vec::new();
        for region in [Region::Body, Region::Header] {
            for (block, content) in self.blocks(region).iter().enumerate() {
                match content {
                    Block::Paragraph(_) | Block::ListItem(_) => elements.push(ElementRef {
                        region,
                        block,
                        cell: None,
                    }),
                    Block::Table(table) => {
                        for (row, cells) in table.rows.iter().enumerate() {
                            for col in 0..cells.len() {
                                elements.push(ElementRef {
                                    region,
                                    block,
                                    cell: Some(CellRef { row, col }),
                                });
                            }
                        }
                    }
                }
            }
        }
        elements
    }

    pub fn text(&self, element: &ElementRef) -> Option<&RichText> {
        let block = self.blocks(element.region).get(element.block)?;
        match (block, element.cell) {
            (Block::Paragraph(p), None) => Some(&p.text),
            (Block::ListItem(li), None) => Some(&li.text),
            (Block::Table(t), Some(cell)) => t.rows.get(cell.row)?.get(cell.col),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, element: &ElementRef) -> Option<&mut RichText> {
        let blocks = match element.region {
            Region::Header => &mut self.header,
            Region::Body => &mut self.body,
        };
        match (blocks.get_mut(element.block)?, element.cell) {
            (Block::Paragraph(p), None) => Some(&mut p.text),
            (Block::ListItem(li), None) => Some(&mut li.text),
            (Block::Table(t), Some(cell)) => t.rows.get_mut(cell.row)?.get_mut(cell.col),
            _ => None,
        }
    }

    /// First literal occurrence of `pattern` across all text elements.
    pub fn find_text(&self, pattern: &str) -> Option<TextMatch> {
        self.find_all_text(pattern).into_iter().next()
    }

    /// Every literal occurrence of `pattern`, in search order. Occurrences within one
    /// element do not overlap.
    pub fn find_all_text(&self, pattern: &str) -> Vec<TextMatch> {
        if pattern.is_empty() {
            return Vec::new();
        }
        let pattern_len = pattern.chars().count();
        let mut matches = Vec::new();
        for element in self.text_elements() {
            let Some(text) = self.text(&element) else {
                continue;
            };
            let haystack = text.text();
            let mut from = 0;
            while let Some(found) = haystack[from..].find(pattern) {
                let byte_start = from + found;
                let start = haystack[..byte_start].chars().count();
                matches.push(TextMatch {
                    element,
                    start,
                    end_inclusive: start + pattern_len - 1,
                });
                from = byte_start + pattern.len();
            }
        }
        matches
    }

    /// Body text, one line per block, tables flattened.
    pub fn body_text(&self) -> String {
        self.body
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new("doc-1", "Resume")
            .with_header(vec![Block::paragraph("Jane Doe")])
            .with_body(vec![
                Block::heading("EXPERIENCE", HeadingStyle::Heading1),
                Block::list_item("Shipped the billing service", 0),
                Block::table(&[&["Rust", "Go"], &["SQL", "Shipped"]]),
            ])
    }

    #[test]
    fn test_text_elements_visit_body_then_header() {
        let doc = sample();
        let elements = doc.text_elements();
        assert_eq!(elements.len(), 2 + 4 + 1);
        assert_eq!(elements[0].region, Region::Body);
        assert_eq!(elements.last().map(|e| e.region), Some(Region::Header));
    }

    #[test]
    fn test_find_text_reports_inclusive_end() {
        let doc = sample();
        let hit = doc.find_text("billing").unwrap();
        assert_eq!(hit.element.block, 1);
        assert_eq!(hit.start, 12);
        assert_eq!(hit.end_inclusive, 18);
        assert_eq!(hit.end(), 19);
    }

    #[test]
    fn test_find_all_text_reaches_table_cells() {
        let doc = sample();
        let hits = doc.find_all_text("Shipped");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].element.cell, Some(CellRef { row: 1, col: 1 }));
    }

    #[test]
    fn test_find_text_empty_pattern_is_none() {
        assert!(sample().find_text("").is_none());
    }

    #[test]
    fn test_table_flatten() {
        let table = Block::table(&[&["a", "b"], &["c", "d"]]);
        assert_eq!(table.text(), "a | b\nc | d");
    }

    #[test]
    fn test_document_json_round_trip_keeps_kind_tags() {
        let doc = sample();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["body"][0]["kind"], "paragraph");
        assert_eq!(json["body"][0]["heading"], "heading1");
        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
