use std::sync::Arc;

use crate::editing::visual_diff::DiffColors;
use crate::store::DocumentStore;
use crate::tailoring::templates::SettingsStore;
use crate::tailoring::AiProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub settings: Arc<dyn SettingsStore>,
    /// `None` when no API key is configured; suggestion endpoints then fail with LLM_ERROR.
    pub ai: Option<Arc<dyn AiProvider>>,
    pub colors: DiffColors,
}
