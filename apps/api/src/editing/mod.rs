//! Mutation Engine + Visual Diff Engine.
//!
//! `mutation` and `visual_diff` operate on an open `Document` and never touch the store.
//! `service` wraps them in the store's open → edit → persist framing, one document
//! operation at a time.

pub mod handlers;
pub mod models;
pub mod mutation;
pub mod service;
pub mod visual_diff;

use tracing::debug;

use crate::document::{Document, ElementRef, RichText};
use crate::text::{locate, MatchKind};

pub use models::{BatchResult, ChangeProposal, OperationResult, Outcome, ProposalResult};

/// Where an operation will act: one element and a character span inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub element: ElementRef,
    pub start: usize,
    pub end: usize,
    pub kind: MatchKind,
}

/// Finds `search` in the document: the global literal search first, then the
/// Fuzzy Locator element by element. First positive match wins.
pub fn locate_target(document: &Document, search: &str) -> Option<Target> {
    locate_target_where(document, search, |_, _| true)
}

/// Like [`locate_target`], skipping candidates rejected by `accept`.
pub fn locate_target_where(
    document: &Document,
    search: &str,
    accept: impl Fn(&RichText, &Target) -> bool,
) -> Option<Target> {
    let accepted = |target: Target| {
        document
            .text(&target.element)
            .is_some_and(|text| accept(text, &target))
            .then_some(target)
    };

    let literal = document.find_all_text(search).into_iter().find_map(|hit| {
        accepted(Target {
            element: hit.element,
            start: hit.start,
            end: hit.end(),
            kind: MatchKind::Exact,
        })
    });
    if literal.is_some() {
        return literal;
    }

    document.text_elements().into_iter().find_map(|element| {
        let text = document.text(&element)?.text();
        let located = locate(search, &text)?;
        let target = accepted(Target {
            element,
            start: located.start,
            end: located.end,
            kind: located.kind,
        })?;
        debug!(
            kind = ?located.kind,
            block = element.block,
            "Fuzzy locator matched element"
        );
        Some(target)
    })
}

/// Short, single-line preview of user text for result messages.
pub(crate) fn preview(text: &str) -> String {
    const MAX: usize = 60;
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > MAX {
        format!("{}…", flat.chars().take(MAX).collect::<String>())
    } else {
        flat
    }
}
