//! Axum route handlers for reading documents.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::parsing::{extract_name, parse, SectionModel};
use crate::routes::run_blocking;
use crate::state::AppState;
use crate::store::{read_document, DocumentRef};

#[derive(Debug, Serialize)]
pub struct NameResponse {
    pub name: Option<String>,
}

/// GET /api/v1/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentRef>>, AppError> {
    let refs = run_blocking(move || state.store.list()).await??;
    Ok(Json(refs))
}

/// GET /api/v1/documents/:id/sections
///
/// Returns the Section Model of the document body.
pub async fn handle_sections(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SectionModel>, AppError> {
    let document = run_blocking(move || read_document(state.store.as_ref(), &id)).await??;
    Ok(Json(parse(&document)))
}

/// GET /api/v1/documents/:id/name
pub async fn handle_name(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NameResponse>, AppError> {
    let document = run_blocking(move || read_document(state.store.as_ref(), &id)).await??;
    Ok(Json(NameResponse {
        name: extract_name(&document),
    }))
}
