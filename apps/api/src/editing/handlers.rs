//! Axum route handlers for document mutation and change review.
//!
//! Locator misses come back as `200 {success: false, message}`; only store failures
//! become error responses.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::editing::service;
use crate::editing::visual_diff::PendingChange;
use crate::editing::{BatchResult, ChangeProposal, OperationResult, Outcome};
use crate::errors::AppError;
use crate::routes::run_blocking;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChangeRequest {
    pub original: String,
    #[serde(alias = "tailored")]
    pub replacement: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub original: String,
    #[serde(alias = "tailored")]
    pub replacement: String,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
pub struct ResolveByIdRequest {
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
pub struct MarkAllRequest {
    pub proposals: Vec<ChangeProposal>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveAllRequest {
    pub proposals: Vec<ChangeProposal>,
    pub outcome: Outcome,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/:id/replace
///
/// Replaces text in place, keeping the formatting of the replaced span.
pub async fn handle_replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ChangeRequest>,
) -> Result<Json<OperationResult>, AppError> {
    let result = run_blocking(move || {
        service::replace_text(state.store.as_ref(), &id, &request.original, &request.replacement)
    })
    .await??;
    Ok(Json(result))
}

/// POST /api/v1/documents/:id/changes/mark
pub async fn handle_mark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ChangeRequest>,
) -> Result<Json<OperationResult>, AppError> {
    let result = run_blocking(move || {
        service::mark_change(
            state.store.as_ref(),
            &id,
            &request.original,
            &request.replacement,
            &state.colors,
        )
    })
    .await??;
    Ok(Json(result))
}

/// POST /api/v1/documents/:id/changes/resolve
///
/// Resolves a marked change by its original/replacement text.
pub async fn handle_resolve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<OperationResult>, AppError> {
    let result = run_blocking(move || {
        service::resolve_change(
            state.store.as_ref(),
            &id,
            &request.original,
            &request.replacement,
            request.outcome,
        )
    })
    .await??;
    Ok(Json(result))
}

/// POST /api/v1/documents/:id/changes/:change_id/resolve
///
/// Resolves a marked change by the id `mark` returned.
pub async fn handle_resolve_by_id(
    State(state): State<AppState>,
    Path((id, change_id)): Path<(String, Uuid)>,
    Json(request): Json<ResolveByIdRequest>,
) -> Result<Json<OperationResult>, AppError> {
    let result = run_blocking(move || {
        service::resolve_change_by_id(state.store.as_ref(), &id, change_id, request.outcome)
    })
    .await??;
    Ok(Json(result))
}

/// GET /api/v1/documents/:id/changes
pub async fn handle_pending(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PendingChange>>, AppError> {
    let pending =
        run_blocking(move || service::pending_changes(state.store.as_ref(), &id)).await??;
    Ok(Json(pending))
}

/// POST /api/v1/documents/:id/changes/mark-all
pub async fn handle_mark_all(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MarkAllRequest>,
) -> Result<Json<BatchResult>, AppError> {
    let batch = run_blocking(move || {
        service::mark_all(state.store.as_ref(), &id, &request.proposals, &state.colors)
    })
    .await??;
    Ok(Json(batch))
}

/// POST /api/v1/documents/:id/changes/resolve-all
pub async fn handle_resolve_all(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveAllRequest>,
) -> Result<Json<BatchResult>, AppError> {
    let batch = run_blocking(move || {
        service::resolve_all(state.store.as_ref(), &id, &request.proposals, request.outcome)
    })
    .await??;
    Ok(Json(batch))
}
