use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use crate::tailoring::TailorError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Locator misses never land here: they are `{success: false}` operation results.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unparseable document: {0}")]
    Unparseable(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AppError::NotFound(format!("Document {id} not found")),
            other => AppError::Store(other),
        }
    }
}

impl From<TailorError> for AppError {
    fn from(e: TailorError) -> Self {
        match e {
            TailorError::Store(e) => e.into(),
            TailorError::Unparseable(_) => AppError::Unparseable(e.to_string()),
            TailorError::EmptyJobDescription => AppError::Validation(e.to_string()),
            TailorError::Llm(_) | TailorError::Malformed(_) | TailorError::NoProvider => {
                AppError::Llm(e.to_string())
            }
            TailorError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unparseable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPARSEABLE_DOCUMENT",
                msg.clone(),
            ),
            AppError::Store(e) if e.is_stale_reference() => {
                tracing::warn!("Store reference error: {e}");
                (StatusCode::NOT_FOUND, "STORE_ERROR", e.to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A document storage error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_document_maps_to_not_found() {
        let err: AppError = StoreError::NotFound("cv".to_string()).into();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unparseable_maps_to_422() {
        let err: AppError = TailorError::Unparseable("cv".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_inaccessible_document_is_store_error() {
        let err: AppError = StoreError::Inaccessible {
            id: "../x".to_string(),
            reason: "bad id".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Store(_)));
    }
}
