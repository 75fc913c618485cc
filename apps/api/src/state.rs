use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::AiClient;
use crate::storage::FileStorage;
use crate::vector::VectorStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Storage, AI client, and vector index are trait objects so their backing
/// implementations can be swapped by configuration without touching call sites.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<dyn FileStorage>,
    pub ai: Arc<dyn AiClient>,
    pub vector_store: Arc<dyn VectorStore>,
    pub config: Config,
}
