//! Store-framed document operations.
//!
//! Each operation is one open → edit → persist cycle. Batches run their proposals
//! sequentially, each in its own cycle, and never abort on a failed proposal.

use tracing::{info, warn};
use uuid::Uuid;

use crate::editing::visual_diff::{self, DiffColors, PendingChange};
use crate::editing::{mutation, BatchResult, ChangeProposal, OperationResult, Outcome};
use crate::store::{read_document, with_document, DocumentStore, StoreError};

pub fn replace_text(
    store: &dyn DocumentStore,
    document_id: &str,
    original: &str,
    replacement: &str,
) -> Result<OperationResult, StoreError> {
    with_document(store, document_id, |doc| {
        mutation::replace(doc, original, replacement)
    })
}

pub fn mark_change(
    store: &dyn DocumentStore,
    document_id: &str,
    original: &str,
    replacement: &str,
    colors: &DiffColors,
) -> Result<OperationResult, StoreError> {
    with_document(store, document_id, |doc| {
        visual_diff::mark(doc, original, replacement, colors)
    })
}

pub fn resolve_change(
    store: &dyn DocumentStore,
    document_id: &str,
    original: &str,
    replacement: &str,
    outcome: Outcome,
) -> Result<OperationResult, StoreError> {
    with_document(store, document_id, |doc| {
        visual_diff::resolve(doc, original, replacement, outcome)
    })
}

pub fn resolve_change_by_id(
    store: &dyn DocumentStore,
    document_id: &str,
    change_id: Uuid,
    outcome: Outcome,
) -> Result<OperationResult, StoreError> {
    with_document(store, document_id, |doc| {
        visual_diff::resolve_by_id(doc, change_id, outcome)
    })
}

pub fn pending_changes(
    store: &dyn DocumentStore,
    document_id: &str,
) -> Result<Vec<PendingChange>, StoreError> {
    read_document(store, document_id).map(|doc| visual_diff::pending_changes(&doc))
}

/// Marks every proposal. Fails as a whole only when the document cannot be opened
/// at all; afterwards, store errors become per-proposal failures.
pub fn mark_all(
    store: &dyn DocumentStore,
    document_id: &str,
    proposals: &[ChangeProposal],
    colors: &DiffColors,
) -> Result<BatchResult, StoreError> {
    read_document(store, document_id)?;
    let batch = BatchResult::collect(proposals, |p| {
        framed(mark_change(store, document_id, &p.original, &p.replacement, colors))
    });
    log_batch("mark", document_id, &batch);
    Ok(batch)
}

pub fn resolve_all(
    store: &dyn DocumentStore,
    document_id: &str,
    proposals: &[ChangeProposal],
    outcome: Outcome,
) -> Result<BatchResult, StoreError> {
    read_document(store, document_id)?;
    let batch = BatchResult::collect(proposals, |p| {
        framed(resolve_change(store, document_id, &p.original, &p.replacement, outcome))
    });
    log_batch("resolve", document_id, &batch);
    Ok(batch)
}

fn framed(result: Result<OperationResult, StoreError>) -> OperationResult {
    result.unwrap_or_else(|e| OperationResult::failed(format!("Document store error: {e}")))
}

fn log_batch(operation: &str, document_id: &str, batch: &BatchResult) {
    if batch.failed_count > 0 {
        warn!(
            document_id,
            applied = batch.applied_count,
            failed = batch.failed_count,
            "Batch {operation} finished with failures"
        );
    } else {
        info!(document_id, applied = batch.applied_count, "Batch {operation} finished");
    }
}
