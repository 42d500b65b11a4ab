use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::document::rich_text::{RichText, TextStyle};

/// Style attributes sampled at one character and reapplied over a range.
///
/// Fields that were unset at the sample point stay unset: applying the snapshot never
/// forces a property that had no explicit value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingSnapshot {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub foreground_color: Option<String>,
}

impl FormattingSnapshot {
    pub fn capture(text: &RichText, offset: usize) -> Self {
        Self::from(text.style_at(offset))
    }

    pub fn apply(&self, text: &mut RichText, range: Range<usize>) {
        text.update(range, |run| self.overlay(&mut run.style));
    }

    /// Copies every set field onto `style`, leaving the rest untouched.
    pub fn overlay(&self, style: &mut TextStyle) {
        if let Some(family) = &self.font_family {
            style.font_family = Some(family.clone());
        }
        if let Some(size) = self.font_size {
            style.font_size = Some(size);
        }
        if let Some(bold) = self.bold {
            style.bold = Some(bold);
        }
        if let Some(italic) = self.italic {
            style.italic = Some(italic);
        }
        if let Some(underline) = self.underline {
            style.underline = Some(underline);
        }
        if let Some(strike) = self.strikethrough {
            style.strikethrough = Some(strike);
        }
        if let Some(color) = &self.foreground_color {
            style.foreground_color = Some(color.clone());
        }
    }
}

impl From<TextStyle> for FormattingSnapshot {
    fn from(style: TextStyle) -> Self {
        Self {
            font_family: style.font_family,
            font_size: style.font_size,
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
            strikethrough: style.strikethrough,
            foreground_color: style.foreground_color,
        }
    }
}
