//! Styled text runs: the editable content of a single paragraph, list item, or table cell.
//!
//! All offsets are character offsets (Unicode scalar values), never byte offsets.
//! Every edit re-coalesces the run list so adjacent runs with identical attributes merge.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-character style attributes. `None` means "not explicitly set" (inherits the
/// document default), which is distinct from an explicit `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
}

/// Which half of a proposed change a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeRole {
    Deletion,
    Insertion,
}

/// Marking attributes a deletion run had before it was struck through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorMarking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
}

impl PriorMarking {
    pub fn of(style: &TextStyle) -> Self {
        Self {
            strikethrough: style.strikethrough,
            foreground_color: style.foreground_color.clone(),
        }
    }

    pub fn restore(self, style: &mut TextStyle) {
        style.strikethrough = self.strikethrough;
        style.foreground_color = self.foreground_color;
    }
}

/// Opaque marker pairing a deletion run with its insertion run.
///
/// Deletion runs also remember their pre-mark strikethrough and color in `prior`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTag {
    pub id: Uuid,
    pub role: ChangeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<PriorMarking>,
}

impl ChangeTag {
    pub fn deletion(id: Uuid, prior: PriorMarking) -> Self {
        Self {
            id,
            role: ChangeRole::Deletion,
            prior: Some(prior),
        }
    }

    pub fn insertion(id: Uuid) -> Self {
        Self {
            id,
            role: ChangeRole::Insertion,
            prior: None,
        }
    }

    pub fn is(&self, id: Uuid, role: ChangeRole) -> bool {
        self.id == id && self.role == role
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeTag>,
}

impl Run {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            change: None,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn same_attributes(&self, other: &Run) -> bool {
        self.style == other.style && self.change == other.change
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    runs: Vec<Run>,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::from_runs(vec![Run::new(text, TextStyle::default())])
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self::from_runs(vec![Run::new(text, style)])
    }

    pub fn from_runs(runs: Vec<Run>) -> Self {
        let mut text = Self { runs };
        text.coalesce();
        text
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Style of the character at `offset`. Offsets at or past the end sample the
    /// last character; an empty text yields the default style.
    pub fn style_at(&self, offset: usize) -> TextStyle {
        self.run_at(offset)
            .map(|r| r.style.clone())
            .unwrap_or_default()
    }

    pub fn change_at(&self, offset: usize) -> Option<ChangeTag> {
        self.run_at(offset).and_then(|r| r.change.clone())
    }

    fn run_at(&self, offset: usize) -> Option<&Run> {
        let mut pos = 0;
        let mut last = None;
        for run in self.runs.iter().filter(|r| !r.text.is_empty()) {
            let len = run.char_len();
            if offset < pos + len {
                return Some(run);
            }
            pos += len;
            last = Some(run);
        }
        last
    }

    /// Inserts `text` at `offset`. The new run inherits the style of the character
    /// before the insertion point (or the first character when inserting at 0) and
    /// carries no change tag.
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = offset.min(self.char_len());
        let style = self.style_at(offset.saturating_sub(1));
        let idx = self.split_at(offset);
        self.runs.insert(idx, Run::new(text, style));
        self.coalesce();
    }

    /// Deletes the characters in `range` (end exclusive, clamped to the text length).
    pub fn delete(&mut self, range: Range<usize>) {
        let (start, end) = self.clamp(range);
        if start >= end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        self.runs.drain(first..last);
        self.coalesce();
    }

    /// Applies `edit` to every run covering `range`, splitting runs at the bounds.
    pub fn update(&mut self, range: Range<usize>, mut edit: impl FnMut(&mut Run)) {
        let (start, end) = self.clamp(range);
        if start >= end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        for run in &mut self.runs[first..last] {
            edit(run);
        }
        self.coalesce();
    }

    /// Character ranges of all runs tagged with `id` in the given role, in order.
    pub fn change_ranges(&self, id: Uuid, role: ChangeRole) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = Vec::new();
        let mut pos = 0;
        for run in &self.runs {
            let len = run.char_len();
            if run.change.as_ref().is_some_and(|tag| tag.is(id, role)) {
                match ranges.last_mut() {
                    Some(prev) if prev.end == pos => prev.end = pos + len,
                    _ => ranges.push(pos..pos + len),
                }
            }
            pos += len;
        }
        ranges
    }

    pub fn has_change(&self, id: Uuid) -> bool {
        self.runs
            .iter()
            .any(|r| r.change.as_ref().is_some_and(|tag| tag.id == id))
    }

    /// Ids of all changes present in this text, in first-seen order.
    pub fn change_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for tag in self.runs.iter().filter_map(|r| r.change.as_ref()) {
            if !ids.contains(&tag.id) {
                ids.push(tag.id);
            }
        }
        ids
    }

    fn clamp(&self, range: Range<usize>) -> (usize, usize) {
        let len = self.char_len();
        (range.start.min(len), range.end.min(len))
    }

    /// Ensures a run boundary at `offset` and returns the index of the run starting there.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.runs.len() {
            if pos == offset {
                return i;
            }
            let len = self.runs[i].char_len();
            if offset < pos + len {
                let at = byte_index(&self.runs[i].text, offset - pos);
                let tail = self.runs[i].text.split_off(at);
                let mut right = self.runs[i].clone();
                right.text = tail;
                self.runs.insert(i + 1, right);
                return i + 1;
            }
            pos += len;
        }
        self.runs.len()
    }

    fn coalesce(&mut self) {
        self.runs.retain(|r| !r.text.is_empty());
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.same_attributes(&run) => prev.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

/// Byte index of the `char_idx`-th character of `s`, or `s.len()` past the end.
pub fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}
