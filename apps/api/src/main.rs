mod candidates;
mod config;
mod db;
mod embedding;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod resumes;
mod routes;
mod state;
mod storage;
mod vector;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, VectorBackend};
use crate::db::create_pool;
use crate::llm_client::{AiClient, GeminiClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStorage, LocalFileStorage};
use crate::vector::chroma::ChromaVectorStore;
use crate::vector::memory::InMemoryVectorStore;
use crate::vector::VectorStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting HR Recruitment Assistant API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize upload storage
    let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(&config.upload_dir));
    info!("File storage rooted at {}", config.upload_dir);

    // Initialize AI client
    let ai: Arc<dyn AiClient> = Arc::new(GeminiClient::new(
        config.google_ai_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_embedding_model.clone(),
    ));
    info!(
        "AI client initialized (model: {}, embedding model: {})",
        config.gemini_model, config.gemini_embedding_model
    );

    // Initialize vector index (backend selected by VECTOR_STORE)
    let vector_store: Arc<dyn VectorStore> = match config.vector_backend {
        VectorBackend::Chroma => {
            info!("Vector store: Chroma at {}", config.chromadb_url);
            Arc::new(ChromaVectorStore::new(config.chromadb_url.clone()))
        }
        VectorBackend::Memory => {
            info!("Vector store: in-memory");
            Arc::new(InMemoryVectorStore::new())
        }
    };

    // Build app state
    let state = AppState {
        db,
        storage,
        ai,
        vector_store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
