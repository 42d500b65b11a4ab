//! Tailoring workflow: ask an AI provider for change proposals against a resume and
//! mark them on a fresh copy for review.
//!
//! The copy and the edits are separate store interactions. Once the copy exists it is
//! always reported back, whatever happens afterwards.

pub mod handlers;
pub mod prompts;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::editing::service::mark_all;
use crate::editing::visual_diff::DiffColors;
use crate::editing::{BatchResult, ChangeProposal};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, LlmError};
use crate::parsing::{parse, SectionModel};
use crate::store::{read_document, DocumentRef, DocumentStore, StoreError};
use crate::tailoring::prompts::{SUGGEST_PROMPT_TEMPLATE, SUGGEST_ROLE};

#[derive(Debug, Error)]
pub enum TailorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Document '{0}' has no recognizable sections or content")]
    Unparseable(String),

    #[error("job_description cannot be empty")]
    EmptyJobDescription,

    #[error("No AI provider is configured")]
    NoProvider,

    #[error("AI provider error: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not read AI suggestions: {0}")]
    Malformed(String),

    #[error("Background task failed: {0}")]
    Internal(String),
}

// ────────────────────────────────────────────────────────────────────────────
// AI provider seam
// ────────────────────────────────────────────────────────────────────────────

/// Provider-agnostic text completion. Carried in `AppState` as `Arc<dyn AiProvider>`.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn call_ai(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    Wrapped { changes: Vec<ChangeProposal> },
    Bare(Vec<ChangeProposal>),
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TailorRequest {
    pub job_description: String,
    pub name: String,
    #[serde(default)]
    pub folder: Option<String>,
}

/// Result of a tailoring run. `copy` is always present; `error` says which later
/// step stopped the run, if any.
#[derive(Debug, Clone, Serialize)]
pub struct TailorOutcome {
    pub copy: DocumentRef,
    pub proposals: Vec<ChangeProposal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Workflow
// ────────────────────────────────────────────────────────────────────────────

/// Opens and parses a document, rejecting one with no content items.
pub fn document_model(store: &dyn DocumentStore, id: &str) -> Result<SectionModel, TailorError> {
    let document = read_document(store, id)?;
    let model = parse(&document);
    if model.content_count() == 0 {
        return Err(TailorError::Unparseable(id.to_string()));
    }
    Ok(model)
}

/// Renders the non-empty sections as the prompt's resume text.
pub fn render_sections(model: &SectionModel) -> String {
    let mut out = String::new();
    for section in model.sections.iter().filter(|s| !s.items.is_empty()) {
        out.push_str(&format!("## {}\n", section.name));
        for item in &section.items {
            let indent = "  ".repeat(item.nesting_level as usize);
            out.push_str(&format!("{indent}- {}\n", item.content));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Asks the provider for change proposals. Proposals with an empty `original` cannot
/// be located and are dropped here.
pub async fn suggest_changes(
    ai: &dyn AiProvider,
    model: &SectionModel,
    job_description: &str,
) -> Result<Vec<ChangeProposal>, TailorError> {
    if job_description.trim().is_empty() {
        return Err(TailorError::EmptyJobDescription);
    }

    let prompt = SUGGEST_PROMPT_TEMPLATE
        .replace("{resume}", &render_sections(model))
        .replace("{job_description}", job_description.trim());
    let system = format!("{SUGGEST_ROLE} {JSON_ONLY_SYSTEM}");
    let reply = ai.call_ai(&system, &prompt).await?;

    let payload: SuggestionPayload = serde_json::from_str(strip_json_fences(&reply))
        .map_err(|e| TailorError::Malformed(e.to_string()))?;
    let proposals = match payload {
        SuggestionPayload::Wrapped { changes } => changes,
        SuggestionPayload::Bare(changes) => changes,
    };

    let total = proposals.len();
    let proposals: Vec<ChangeProposal> = proposals
        .into_iter()
        .filter(|p| !p.original.trim().is_empty())
        .collect();
    if proposals.len() < total {
        warn!(
            discarded = total - proposals.len(),
            "Discarded AI proposals with empty original text"
        );
    }
    info!(count = proposals.len(), "Received change proposals");
    Ok(proposals)
}

/// Copies `source_id`, asks for proposals against the copy and marks them all.
///
/// Only a failed copy is an `Err`. Any later failure is reported inside the outcome
/// next to the copy it happened on.
pub async fn tailor_copy(
    store: Arc<dyn DocumentStore>,
    ai: &dyn AiProvider,
    source_id: &str,
    request: &TailorRequest,
    colors: &DiffColors,
) -> Result<TailorOutcome, TailorError> {
    if request.job_description.trim().is_empty() {
        return Err(TailorError::EmptyJobDescription);
    }

    let copy = {
        let store = store.clone();
        let source_id = source_id.to_string();
        let name = request.name.clone();
        let folder = request.folder.clone();
        blocking(move || store.copy(&source_id, &name, folder.as_deref())).await??
    };
    info!(source = source_id, copy = %copy.id, "Created tailored copy");

    let mut outcome = TailorOutcome {
        copy: copy.clone(),
        proposals: Vec::new(),
        batch: None,
        error: None,
    };

    let model = {
        let store = store.clone();
        let id = copy.id.clone();
        match blocking(move || document_model(store.as_ref(), &id)).await {
            Ok(Ok(model)) => model,
            Ok(Err(e)) | Err(e) => return Ok(outcome.failed(e)),
        }
    };

    outcome.proposals = match suggest_changes(ai, &model, &request.job_description).await {
        Ok(proposals) => proposals,
        Err(e) => return Ok(outcome.failed(e)),
    };

    let batch = {
        let id = copy.id.clone();
        let proposals = outcome.proposals.clone();
        let colors = colors.clone();
        blocking(move || mark_all(store.as_ref(), &id, &proposals, &colors)).await
    };
    match batch {
        Ok(Ok(batch)) => outcome.batch = Some(batch),
        Ok(Err(e)) => return Ok(outcome.failed(e.into())),
        Err(e) => return Ok(outcome.failed(e)),
    }
    Ok(outcome)
}

impl TailorOutcome {
    fn failed(mut self, error: TailorError) -> Self {
        warn!(copy = %self.copy.id, "Tailoring stopped after copy: {error}");
        self.error = Some(error.to_string());
        self
    }
}

async fn blocking<T: Send + 'static>(
    work: impl FnOnce() -> T + Send + 'static,
) -> Result<T, TailorError> {
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| TailorError::Internal(format!("spawn_blocking failed in tailoring: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Test double
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replies with canned responses in order and records every prompt it was sent.
    #[derive(Default)]
    pub struct ScriptedAi {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedAi {
        pub fn replying(replies: impl IntoIterator<Item = &'static str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
                prompts: Mutex::default(),
            }
        }

        pub fn failing() -> Self {
            Self {
                replies: Mutex::new(VecDeque::from([Err(LlmError::EmptyContent)])),
                prompts: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedAi {
        async fn call_ai(&self, _system: &str, user_message: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(user_message.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }
}
