//! Axum route handlers for AI suggestions, tailored copies and user templates.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::editing::ChangeProposal;
use crate::errors::AppError;
use crate::routes::run_blocking;
use crate::state::AppState;
use crate::store::DocumentRef;
use crate::tailoring::templates::{resolve_template, set_template};
use crate::tailoring::{
    document_model, suggest_changes, tailor_copy, TailorError, TailorOutcome, TailorRequest,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub proposals: Vec<ChangeProposal>,
}

#[derive(Debug, Deserialize)]
pub struct SetTemplateRequest {
    pub document_id: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template: Option<DocumentRef>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/:id/suggestions
///
/// Asks the AI provider for change proposals. Nothing is written to the document.
pub async fn handle_suggest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }
    let ai = state.ai.clone().ok_or(TailorError::NoProvider)?;

    let store = state.store.clone();
    let model = run_blocking(move || document_model(store.as_ref(), &id)).await??;
    let proposals = suggest_changes(ai.as_ref(), &model, &request.job_description).await?;

    Ok(Json(SuggestResponse { proposals }))
}

/// POST /api/v1/documents/:id/tailor
///
/// Copy → suggest → mark all. Once the copy exists the response is 200 with the copy
/// ref, and `error` set if a later step failed.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorOutcome>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let ai = state.ai.clone().ok_or(TailorError::NoProvider)?;

    let outcome = tailor_copy(state.store.clone(), ai.as_ref(), &id, &request, &state.colors).await?;
    Ok(Json(outcome))
}

/// PUT /api/v1/users/:user/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Json(request): Json<SetTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = run_blocking(move || {
        set_template(
            state.settings.as_ref(),
            state.store.as_ref(),
            &user,
            &request.document_id,
        )
    })
    .await??;
    Ok(Json(TemplateResponse {
        template: Some(template),
    }))
}

/// GET /api/v1/users/:user/template
///
/// A stale reference is removed and reported as STORE_ERROR.
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = run_blocking(move || {
        resolve_template(state.settings.as_ref(), state.store.as_ref(), &user)
    })
    .await?
    .map_err(AppError::Store)?;
    Ok(Json(TemplateResponse { template }))
}
