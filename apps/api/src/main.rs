mod config;
mod document;
mod editing;
mod errors;
mod llm_client;
mod parsing;
mod routes;
mod state;
mod store;
mod tailoring;
mod text;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::editing::visual_diff::DiffColors;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{DocumentStore, FsStore, MemoryStore};
use crate::tailoring::templates::MemorySettings;
use crate::tailoring::AiProvider;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Fs => Arc::new(FsStore::new(&config.document_root)?),
        StoreBackend::Memory => {
            warn!("Using in-memory document store; documents are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let ai: Option<Arc<dyn AiProvider>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(client))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; suggestion endpoints are disabled");
            None
        }
    };

    let state = AppState {
        store,
        settings: Arc::new(MemorySettings::new()),
        ai,
        colors: DiffColors {
            deletion: config.deletion_color.clone(),
            insertion: config.insertion_color.clone(),
        },
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
