//! Visual Diff Engine: proposed edits rendered inside the document.
//!
//! A proposal becomes two adjacent runs: the original text struck through in the
//! deletion color, immediately followed by the replacement in the insertion color.
//! Both runs carry the same change tag. Resolution collapses the pair:
//!
//! - accept: drop the deletion run, clear the color of the insertion run
//! - reject: drop the insertion run, restore the deletion run's pre-mark strikethrough
//!   and color
//!
//! Resolved changes are terminal. Resolving again finds no marked pair and fails
//! without touching the document.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::{
    ChangeRole, ChangeTag, Document, ElementRef, FormattingSnapshot, PriorMarking, RichText,
    Run, TextMatch,
};
use crate::editing::{
    locate_target, locate_target_where, preview, OperationResult, Outcome, Target,
};
use crate::text::locator::char_len;
use crate::text::normalize;

pub const DEFAULT_DELETION_COLOR: &str = "#CC0000";
pub const DEFAULT_INSERTION_COLOR: &str = "#1A7F37";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffColors {
    pub deletion: String,
    pub insertion: String,
}

impl Default for DiffColors {
    fn default() -> Self {
        Self {
            deletion: DEFAULT_DELETION_COLOR.to_string(),
            insertion: DEFAULT_INSERTION_COLOR.to_string(),
        }
    }
}

/// A marked, unresolved change as currently present in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub change_id: Uuid,
    pub element: ElementRef,
    pub original: String,
    pub replacement: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Propose
// ────────────────────────────────────────────────────────────────────────────

/// Marks `original` as deleted and inserts `replacement` right after it.
pub fn mark(
    document: &mut Document,
    original: &str,
    replacement: &str,
    colors: &DiffColors,
) -> OperationResult {
    if original.trim().is_empty() {
        return OperationResult::failed("Original text is empty");
    }
    let unmarked = |text: &RichText, target: &Target| {
        (target.start..target.end).all(|offset| text.change_at(offset).is_none())
    };
    let Some(target) = locate_target_where(document, original, unmarked) else {
        let message = if locate_target(document, original).is_some() {
            format!("\"{}\" is already part of a pending change", preview(original))
        } else {
            format!("Could not find \"{}\" in the document", preview(original))
        };
        return OperationResult::failed(message);
    };
    let Some(text) = document.text_mut(&target.element) else {
        return OperationResult::failed("Matched element is no longer addressable");
    };

    let id = Uuid::new_v4();
    let snapshot = FormattingSnapshot::capture(text, target.start);

    text.update(target.start..target.end, |run| {
        run.change = Some(ChangeTag::deletion(id, PriorMarking::of(&run.style)));
        run.style.strikethrough = Some(true);
        run.style.foreground_color = Some(colors.deletion.clone());
    });

    let inserted = target.end..target.end + char_len(replacement);
    text.insert(target.end, replacement);
    text.update(inserted, |run| {
        if let Some(family) = &snapshot.font_family {
            run.style.font_family = Some(family.clone());
        }
        if let Some(size) = snapshot.font_size {
            run.style.font_size = Some(size);
        }
        run.style.bold = Some(snapshot.bold.unwrap_or(false));
        run.style.italic = Some(snapshot.italic.unwrap_or(false));
        run.style.strikethrough = Some(false);
        run.style.foreground_color = Some(colors.insertion.clone());
        run.change = Some(ChangeTag::insertion(id));
    });

    info!(change_id = %id, kind = ?target.kind, "Marked proposed change");
    OperationResult::ok(format!("Marked change to \"{}\"", preview(original))).with_change_id(id)
}

// ────────────────────────────────────────────────────────────────────────────
// Resolve
// ────────────────────────────────────────────────────────────────────────────

/// Resolves a marked change located by its text: the literal `original + replacement`
/// where `original` is exactly the deletion half of one change and `replacement` is
/// exactly its insertion half.
///
/// When the same pair is marked more than once, the first occurrence is resolved and
/// the message says so. The ambiguity is inherent to text-based lookup;
/// [`resolve_by_id`] does not have it.
pub fn resolve(
    document: &mut Document,
    original: &str,
    replacement: &str,
    outcome: Outcome,
) -> OperationResult {
    if original.is_empty() {
        return OperationResult::failed("Original text is empty");
    }
    let original_len = char_len(original);
    let replacement_len = char_len(replacement);
    let combined = format!("{original}{replacement}");

    let marked: Vec<(TextMatch, Uuid)> = document
        .find_all_text(&combined)
        .into_iter()
        .filter_map(|m| {
            let text = document.text(&m.element)?;
            let id = marked_change_at(text, m.start, original_len, replacement_len)?;
            Some((m, id))
        })
        .collect();

    if let Some((hit, id)) = marked.first() {
        let Some(text) = document.text_mut(&hit.element) else {
            return OperationResult::failed("Matched element is no longer addressable");
        };
        collapse_change(text, *id, outcome);
        info!(change_id = %id, ?outcome, "Resolved change by text");

        let mut message = format!("{} change to \"{}\"", verb(outcome), preview(original));
        if marked.len() > 1 {
            warn!(
                occurrences = marked.len(),
                "Resolved first of several identical marked changes"
            );
            message.push_str(&format!(
                " (first of {} identical marked changes; resolve by change id to pick one)",
                marked.len()
            ));
        }
        return OperationResult::ok(message).with_change_id(*id);
    }

    // The deletion run holds the document's own text, which may differ from the
    // proposal's `original` in quotes or whitespace. Fall back to tagged changes.
    let wanted = normalize(original);
    let tagged = pending_changes(document).into_iter().find(|c| {
        normalize(&c.original) == wanted && normalize(&c.replacement) == normalize(replacement)
    });
    match tagged {
        Some(change) => resolve_by_id(document, change.change_id, outcome),
        None => OperationResult::failed(format!(
            "Could not find a pending change for \"{}\"; it may have been edited or already resolved",
            preview(original)
        )),
    }
}

/// Resolves a marked change by its change tag. Works even when text was typed
/// between or around the two runs.
pub fn resolve_by_id(document: &mut Document, id: Uuid, outcome: Outcome) -> OperationResult {
    let element = document
        .text_elements()
        .into_iter()
        .find(|e| document.text(e).is_some_and(|t| t.has_change(id)));
    let Some(text) = element.and_then(|e| document.text_mut(&e)) else {
        return OperationResult::failed(format!("No pending change with id {id}"));
    };

    collapse_change(text, id, outcome);
    info!(change_id = %id, ?outcome, "Resolved change by id");
    OperationResult::ok(format!("{} change {id}", verb(outcome))).with_change_id(id)
}

/// Every unresolved change in the document, in document search order.
pub fn pending_changes(document: &Document) -> Vec<PendingChange> {
    let mut changes = Vec::new();
    for element in document.text_elements() {
        let Some(text) = document.text(&element) else {
            continue;
        };
        let plain: Vec<char> = text.text().chars().collect();
        let collect = |ranges: Vec<std::ops::Range<usize>>| -> String {
            ranges.into_iter().flat_map(|r| plain[r].to_vec()).collect()
        };
        for id in text.change_ids() {
            changes.push(PendingChange {
                change_id: id,
                element,
                original: collect(text.change_ranges(id, ChangeRole::Deletion)),
                replacement: collect(text.change_ranges(id, ChangeRole::Insertion)),
            });
        }
    }
    changes
}

/// The change whose deletion half is exactly `start..start + original_len` and whose
/// insertion half is exactly the `replacement_len` chars after it.
fn marked_change_at(
    text: &RichText,
    start: usize,
    original_len: usize,
    replacement_len: usize,
) -> Option<Uuid> {
    let tag = text.change_at(start)?;
    if tag.role != ChangeRole::Deletion {
        return None;
    }
    let deletion = start..start + original_len;
    let insertion = deletion.end..deletion.end + replacement_len;
    let expected_insertions = if insertion.is_empty() { vec![] } else { vec![insertion] };

    let whole = text.change_ranges(tag.id, ChangeRole::Deletion) == vec![deletion]
        && text.change_ranges(tag.id, ChangeRole::Insertion) == expected_insertions;
    whole.then_some(tag.id)
}

fn collapse_change(text: &mut RichText, id: Uuid, outcome: Outcome) {
    let deletions = text.change_ranges(id, ChangeRole::Deletion);
    let insertions = text.change_ranges(id, ChangeRole::Insertion);
    let (kept, dropped) = match outcome {
        Outcome::Accept => (insertions, deletions),
        Outcome::Reject => (deletions, insertions),
    };

    for range in kept {
        text.update(range, |run| clear_marking(run, outcome));
    }
    for range in dropped.into_iter().rev() {
        text.delete(range);
    }
}

/// Accept clears the insertion color; reject puts back what the deletion run had
/// before it was marked.
fn clear_marking(run: &mut Run, outcome: Outcome) {
    let prior = run.change.take().and_then(|tag| tag.prior);
    match outcome {
        Outcome::Accept => run.style.foreground_color = None,
        Outcome::Reject => prior.unwrap_or_default().restore(&mut run.style),
    }
}

fn verb(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Accept => "Accepted",
        Outcome::Reject => "Rejected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, HeadingStyle, Paragraph, TextStyle};

    const ORIGINAL: &str = "Wrote backend services in Python.";
    const REPLACEMENT: &str = "Built backend services using Python.";

    fn bold_italic() -> TextStyle {
        TextStyle {
            bold: Some(true),
            italic: Some(true),
            ..TextStyle::default()
        }
    }

    fn resume() -> Document {
        Document::new("d", "resume").with_body(vec![
            Block::heading("EXPERIENCE", HeadingStyle::Heading1),
            Block::styled(ORIGINAL, bold_italic()),
            Block::paragraph("Mentored two interns."),
        ])
    }

    fn paragraph(doc: &Document, idx: usize) -> &RichText {
        match &doc.body[idx] {
            Block::Paragraph(Paragraph { text, .. }) => text,
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_mark_produces_adjacent_deletion_then_insertion_runs() {
        let mut doc = resume();
        let colors = DiffColors::default();
        let result = mark(&mut doc, ORIGINAL, REPLACEMENT, &colors);
        assert!(result.success);
        let id = result.change_id.unwrap();

        let text = paragraph(&doc, 1);
        assert_eq!(text.text(), format!("{ORIGINAL}{REPLACEMENT}"));
        let runs = text.runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, ORIGINAL);
        assert_eq!(runs[0].style.strikethrough, Some(true));
        assert_eq!(runs[0].style.foreground_color.as_deref(), Some(DEFAULT_DELETION_COLOR));
        assert_eq!(runs[0].change.as_ref().map(|c| c.role), Some(ChangeRole::Deletion));
        assert_eq!(runs[1].text, REPLACEMENT);
        assert_eq!(runs[1].style.strikethrough, Some(false));
        assert_eq!(runs[1].style.bold, Some(true));
        assert_eq!(runs[1].style.italic, Some(true));
        assert_eq!(runs[1].style.foreground_color.as_deref(), Some(DEFAULT_INSERTION_COLOR));
        assert_eq!(runs[1].change, Some(ChangeTag::insertion(id)));
    }

    #[test]
    fn test_mark_defaults_unset_bold_and_italic_to_false() {
        let mut doc = Document::new("d", "r").with_body(vec![Block::paragraph("Fixed bugs.")]);
        mark(&mut doc, "Fixed bugs.", "Resolved 40 production defects.", &DiffColors::default());
        let runs = paragraph(&doc, 0).runs();
        assert_eq!(runs[1].style.bold, Some(false));
        assert_eq!(runs[1].style.italic, Some(false));
    }

    #[test]
    fn test_accept_leaves_replacement_with_original_flags() {
        let mut doc = resume();
        mark(&mut doc, ORIGINAL, REPLACEMENT, &DiffColors::default());
        let result = resolve(&mut doc, ORIGINAL, REPLACEMENT, Outcome::Accept);
        assert!(result.success, "{:?}", result.message);

        let text = paragraph(&doc, 1);
        assert_eq!(text.text(), REPLACEMENT);
        let style = text.style_at(0);
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.italic, Some(true));
        assert_eq!(style.foreground_color, None);
        assert!(text.runs().iter().all(|r| r.change.is_none()));
    }

    #[test]
    fn test_accept_round_trip_matches_plain_replace() {
        let mut doc = resume();
        let expected = doc.body_text().replacen(ORIGINAL, REPLACEMENT, 1);
        mark(&mut doc, ORIGINAL, REPLACEMENT, &DiffColors::default());
        resolve(&mut doc, ORIGINAL, REPLACEMENT, Outcome::Accept);
        assert_eq!(doc.body_text(), expected);
    }

    #[test]
    fn test_reject_restores_original_text_and_formatting() {
        let mut doc = resume();
        let before = doc.clone();
        mark(&mut doc, ORIGINAL, REPLACEMENT, &DiffColors::default());
        let result = resolve(&mut doc, ORIGINAL, REPLACEMENT, Outcome::Reject);
        assert!(result.success);
        assert_eq!(doc.body, before.body);
    }

    #[test]
    fn test_reject_restores_explicit_color_and_strikethrough() {
        let styled = TextStyle {
            bold: Some(true),
            strikethrough: Some(false),
            foreground_color: Some("#333333".to_string()),
            ..TextStyle::default()
        };
        let mut doc = Document::new("d", "r").with_body(vec![
            Block::styled("Fixed bugs.", styled),
            Block::paragraph("Mentored two interns."),
        ]);
        let before = doc.clone();
        assert!(mark(&mut doc, "Fixed bugs.", "Resolved 40 defects.", &DiffColors::default()).success);
        let result = resolve(&mut doc, "Fixed bugs.", "Resolved 40 defects.", Outcome::Reject);
        assert!(result.success, "{:?}", result.message);
        assert_eq!(doc.body, before.body);
        let style = paragraph(&doc, 0).style_at(0);
        assert_eq!(style.foreground_color.as_deref(), Some("#333333"));
        assert_eq!(style.strikethrough, Some(false));
    }

    #[test]
    fn test_reject_by_id_restores_mixed_colors_per_run() {
        let text = RichText::from_runs(vec![
            Run::new("Fixed ", TextStyle::default()),
            Run::new(
                "bugs.",
                TextStyle {
                    foreground_color: Some("#333333".to_string()),
                    ..TextStyle::default()
                },
            ),
        ]);
        let mut doc = Document::new("d", "r").with_body(vec![Block::Paragraph(Paragraph {
            heading: HeadingStyle::Normal,
            text,
        })]);
        let before = doc.clone();
        let id = mark(&mut doc, "Fixed bugs.", "Shipped fixes.", &DiffColors::default())
            .change_id
            .unwrap();
        assert!(resolve_by_id(&mut doc, id, Outcome::Reject).success);
        assert_eq!(doc.body, before.body);
    }

    #[test]
    fn test_resolve_rejects_partial_match_of_a_change() {
        let mut doc = resume();
        assert!(mark(&mut doc, "backend services", "APIs", &DiffColors::default()).success);
        let marked = doc.clone();

        let result = resolve(&mut doc, "services", "APIs", Outcome::Accept);
        assert!(!result.success);
        assert_eq!(doc, marked);
        assert_eq!(pending_changes(&doc).len(), 1);

        let result = resolve(&mut doc, "backend services", "AP", Outcome::Reject);
        assert!(!result.success);
        assert_eq!(doc, marked);
    }

    #[test]
    fn test_resolving_twice_fails_and_changes_nothing() {
        for outcome in [Outcome::Accept, Outcome::Reject] {
            let mut doc = resume();
            mark(&mut doc, ORIGINAL, REPLACEMENT, &DiffColors::default());
            assert!(resolve(&mut doc, ORIGINAL, REPLACEMENT, outcome).success);
            let settled = doc.clone();
            let again = resolve(&mut doc, ORIGINAL, REPLACEMENT, outcome);
            assert!(!again.success);
            assert_eq!(doc, settled);
        }
    }

    #[test]
    fn test_resolve_after_hand_edit_fails_closed() {
        let mut doc = resume();
        mark(&mut doc, ORIGINAL, REPLACEMENT, &DiffColors::default());
        if let Block::Paragraph(p) = &mut doc.body[1] {
            p.text.insert(ORIGINAL.chars().count(), " ");
        }
        let edited = doc.clone();
        let result = resolve(&mut doc, ORIGINAL, "Something else entirely.", Outcome::Accept);
        assert!(!result.success);
        assert_eq!(doc, edited);
    }

    #[test]
    fn test_resolve_by_id_survives_text_typed_between_runs() {
        let mut doc = resume();
        let id = mark(&mut doc, ORIGINAL, REPLACEMENT, &DiffColors::default())
            .change_id
            .unwrap();
        if let Block::Paragraph(p) = &mut doc.body[1] {
            p.text.insert(ORIGINAL.chars().count(), " [note] ");
        }
        let result = resolve_by_id(&mut doc, id, Outcome::Accept);
        assert!(result.success);
        assert!(paragraph(&doc, 1).text().ends_with(REPLACEMENT));
        assert!(!paragraph(&doc, 1).text().contains("Wrote"));

        let again = resolve_by_id(&mut doc, id, Outcome::Accept);
        assert!(!again.success);
    }

    #[test]
    fn test_resolve_falls_back_to_tag_when_document_text_was_normalized() {
        let mut doc = Document::new("d", "r")
            .with_body(vec![Block::paragraph("Led the team\u{2019}s redesign")]);
        assert!(mark(&mut doc, "Led the team's redesign", "Drove the redesign", &DiffColors::default()).success);
        let result = resolve(&mut doc, "Led the team's redesign", "Drove the redesign", Outcome::Accept);
        assert!(result.success);
        assert_eq!(doc.body_text(), "Drove the redesign");
    }

    #[test]
    fn test_mark_twice_on_same_text_fails() {
        let mut doc = resume();
        assert!(mark(&mut doc, ORIGINAL, REPLACEMENT, &DiffColors::default()).success);
        let second = mark(&mut doc, ORIGINAL, "Another rewrite.", &DiffColors::default());
        assert!(!second.success);
        assert_eq!(pending_changes(&doc).len(), 1);
    }

    #[test]
    fn test_ambiguous_resolution_is_reported() {
        let mut doc = Document::new("d", "r").with_body(vec![
            Block::paragraph("Fixed bugs."),
            Block::paragraph("Fixed bugs."),
        ]);
        let colors = DiffColors::default();
        assert!(mark(&mut doc, "Fixed bugs.", "Shipped fixes.", &colors).success);
        assert!(mark(&mut doc, "Fixed bugs.", "Shipped fixes.", &colors).success);
        let result = resolve(&mut doc, "Fixed bugs.", "Shipped fixes.", Outcome::Accept);
        assert!(result.success);
        assert!(result.message.unwrap().contains("first of 2"));
        assert_eq!(doc.body[0].text(), "Shipped fixes.");
        assert_eq!(pending_changes(&doc).len(), 1);
    }

    #[test]
    fn test_pending_changes_lists_both_halves() {
        let mut doc = resume();
        let id = mark(&mut doc, "backend services", "APIs", &DiffColors::default())
            .change_id
            .unwrap();
        let pending = pending_changes(&doc);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].change_id, id);
        assert_eq!(pending[0].original, "backend services");
        assert_eq!(pending[0].replacement, "APIs");
    }

    #[test]
    fn test_custom_colors_are_applied() {
        let mut doc = resume();
        let colors = DiffColors {
            deletion: "#FF00FF".to_string(),
            insertion: "#0000FF".to_string(),
        };
        mark(&mut doc, "Mentored", "Coached", &colors);
        let runs = paragraph(&doc, 2).runs();
        assert_eq!(runs[0].style.foreground_color.as_deref(), Some("#FF00FF"));
        assert_eq!(runs[1].style.foreground_color.as_deref(), Some("#0000FF"));
    }
}
