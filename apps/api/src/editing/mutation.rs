//! Mutation Engine: in-place text replacement that keeps the original run's formatting.

use tracing::info;

use crate::document::{Document, FormattingSnapshot};
use crate::editing::{locate_target, preview, OperationResult};
use crate::text::locator::char_len;

/// Replaces the best match for `original` with `new_text`.
///
/// Formatting sampled at the match start is reapplied over the inserted text, so the
/// replacement keeps the font, size, weight, slant, underline, strikethrough and color
/// of the text it replaced. Nothing outside the matched span changes.
pub fn replace(document: &mut Document, original: &str, new_text: &str) -> OperationResult {
    if original.trim().is_empty() {
        return OperationResult::failed("Original text is empty");
    }
    let Some(target) = locate_target(document, original) else {
        return OperationResult::failed(format!(
            "Could not find \"{}\" in the document",
            preview(original)
        ));
    };
    let Some(text) = document.text_mut(&target.element) else {
        return OperationResult::failed("Matched element is no longer addressable");
    };

    let snapshot = FormattingSnapshot::capture(text, target.start);
    text.delete(target.start..target.end);
    text.insert(target.start, new_text);
    snapshot.apply(text, target.start..target.start + char_len(new_text));

    info!(kind = ?target.kind, block = target.element.block, "Replaced text");
    OperationResult::ok(format!("Replaced \"{}\"", preview(original)))
}
