pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::editing::handlers as editing;
use crate::errors::AppError;
use crate::parsing::handlers as parsing;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

/// Runs synchronous document work off the async executor.
pub(crate) async fn run_blocking<T: Send + 'static>(
    work: impl FnOnce() -> T + Send + 'static,
) -> Result<T, AppError> {
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed: {e}")))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Documents
        .route("/api/v1/documents", get(parsing::handle_list_documents))
        .route("/api/v1/documents/:id/sections", get(parsing::handle_sections))
        .route("/api/v1/documents/:id/name", get(parsing::handle_name))
        .route("/api/v1/documents/:id/replace", post(editing::handle_replace))
        // Change review
        .route("/api/v1/documents/:id/changes", get(editing::handle_pending))
        .route("/api/v1/documents/:id/changes/mark", post(editing::handle_mark))
        .route(
            "/api/v1/documents/:id/changes/resolve",
            post(editing::handle_resolve),
        )
        .route(
            "/api/v1/documents/:id/changes/mark-all",
            post(editing::handle_mark_all),
        )
        .route(
            "/api/v1/documents/:id/changes/resolve-all",
            post(editing::handle_resolve_all),
        )
        .route(
            "/api/v1/documents/:id/changes/:change_id/resolve",
            post(editing::handle_resolve_by_id),
        )
        // Tailoring
        .route(
            "/api/v1/documents/:id/suggestions",
            post(tailoring::handle_suggest),
        )
        .route("/api/v1/documents/:id/tailor", post(tailoring::handle_tailor))
        .route(
            "/api/v1/users/:user/template",
            get(tailoring::handle_get_template).put(tailoring::handle_set_template),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::document::{Block, Document, HeadingStyle};
    use crate::editing::visual_diff::DiffColors;
    use crate::store::{DocumentStore, MemoryStore};
    use crate::tailoring::templates::{MemorySettings, SettingsStore, TEMPLATE_KEY};
    use crate::tailoring::testing::ScriptedAi;

    fn state_with(ai: Option<ScriptedAi>) -> AppState {
        let store = MemoryStore::new();
        store
            .persist(&Document::new("cv", "Resume").with_body(vec![
                Block::paragraph("Jane Doe"),
                Block::heading("SKILLS", HeadingStyle::Heading1),
                Block::paragraph("Python, SQL"),
            ]))
            .unwrap();
        AppState {
            store: Arc::new(store),
            settings: Arc::new(MemorySettings::new()),
            ai: ai.map(|a| Arc::new(a) as Arc<dyn crate::tailoring::AiProvider>),
            colors: DiffColors::default(),
        }
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(build_router(state_with(None)), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_sections_and_name() {
        let state = state_with(None);
        let (status, body) =
            send(build_router(state.clone()), "GET", "/api/v1/documents/cv/sections", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sections"]["SKILLS"][0]["content"], "Python, SQL");
        assert!(body["sections"]["Header"].is_array());

        let (_, body) = send(build_router(state), "GET", "/api/v1/documents/cv/name", None).await;
        assert_eq!(body["name"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_missing_document_is_404() {
        let (status, body) = send(
            build_router(state_with(None)),
            "GET",
            "/api/v1/documents/ghost/sections",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_locator_miss_is_structured_failure() {
        let (status, body) = send(
            build_router(state_with(None)),
            "POST",
            "/api/v1/documents/cv/replace",
            Some(json!({"original": "COBOL", "replacement": "Rust"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("Could not find"));
    }

    #[tokio::test]
    async fn test_mark_then_accept_by_id() {
        let state = state_with(None);
        let (_, marked) = send(
            build_router(state.clone()),
            "POST",
            "/api/v1/documents/cv/changes/mark",
            Some(json!({"original": "Python, SQL", "replacement": "Rust, Python"})),
        )
        .await;
        assert_eq!(marked["success"], true);
        let change_id = marked["change_id"].as_str().unwrap().to_string();

        let (_, pending) =
            send(build_router(state.clone()), "GET", "/api/v1/documents/cv/changes", None).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let (_, resolved) = send(
            build_router(state.clone()),
            "POST",
            &format!("/api/v1/documents/cv/changes/{change_id}/resolve"),
            Some(json!({"outcome": "accept"})),
        )
        .await;
        assert_eq!(resolved["success"], true);
        assert_eq!(
            state.store.open("cv").unwrap().body_text(),
            "Jane Doe\nSKILLS\nRust, Python"
        );
    }

    #[tokio::test]
    async fn test_mark_all_reports_partial_failure() {
        let (status, body) = send(
            build_router(state_with(None)),
            "POST",
            "/api/v1/documents/cv/changes/mark-all",
            Some(json!({"proposals": [
                {"original": "Python, SQL", "tailored": "Rust"},
                {"original": "COBOL", "tailored": "Rust"}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["applied_count"], 1);
        assert_eq!(body["failed_count"], 1);
        assert_eq!(body["results"][1]["original"], "COBOL");
    }

    #[tokio::test]
    async fn test_suggestions_without_provider_is_llm_error() {
        let (status, body) = send(
            build_router(state_with(None)),
            "POST",
            "/api/v1/documents/cv/suggestions",
            Some(json!({"job_description": "Rust engineer"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_suggestions_empty_job_description_is_validation_error() {
        let (status, body) = send(
            build_router(state_with(Some(ScriptedAi::default()))),
            "POST",
            "/api/v1/documents/cv/suggestions",
            Some(json!({"job_description": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_tailor_returns_copy_and_batch() {
        let ai = ScriptedAi::replying([r#"{"changes":[{"original":"Python, SQL","tailored":"Rust, SQL"}]}"#]);
        let state = state_with(Some(ai));
        let (status, body) = send(
            build_router(state.clone()),
            "POST",
            "/api/v1/documents/cv/tailor",
            Some(json!({"job_description": "Rust engineer", "name": "Resume - Acme"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["copy"]["name"], "Resume - Acme");
        assert_eq!(body["batch"]["applied_count"], 1);
        assert!(body.get("error").is_none());

        let copy_id = body["copy"]["id"].as_str().unwrap();
        assert_ne!(copy_id, "cv");
        assert_eq!(state.store.list().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_template_roundtrip_and_stale_cleanup() {
        let state = state_with(None);
        let (status, body) = send(
            build_router(state.clone()),
            "PUT",
            "/api/v1/users/ana/template",
            Some(json!({"document_id": "cv"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"]["id"], "cv");

        state.settings.set("ana", TEMPLATE_KEY, "gone");
        let (status, body) =
            send(build_router(state.clone()), "GET", "/api/v1/users/ana/template", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "STORE_ERROR");

        let (status, body) =
            send(build_router(state), "GET", "/api/v1/users/ana/template", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["template"].is_null());
    }
}
