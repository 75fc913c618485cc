use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub google_ai_api_key: String,
    pub gemini_model: String,
    pub gemini_embedding_model: String,
    pub upload_dir: String,
    pub max_upload_size_mb: u64,
    pub vector_backend: VectorBackend,
    pub chromadb_url: String,
    pub port: u16,
    pub rust_log: String,
}

/// Which vector-index implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorBackend {
    Memory,
    Chroma,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            google_ai_api_key: require_env("GOOGLE_AI_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.0-flash"),
            gemini_embedding_model: env_or("GEMINI_EMBEDDING_MODEL", "gemini-embedding-001"),
            upload_dir: env_or("UPLOAD_DIR", "./uploads"),
            max_upload_size_mb: env_or("MAX_UPLOAD_SIZE_MB", "10")
                .parse::<u64>()
                .context("MAX_UPLOAD_SIZE_MB must be a positive integer")?,
            vector_backend: parse_vector_backend(&env_or("VECTOR_STORE", "memory"))?,
            chromadb_url: env_or("CHROMADB_URL", "http://localhost:8001"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_vector_backend(value: &str) -> Result<VectorBackend> {
    match value {
        "memory" => Ok(VectorBackend::Memory),
        "chroma" => Ok(VectorBackend::Chroma),
        other => bail!("VECTOR_STORE must be 'memory' or 'chroma', got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector_backend_known_values() {
        assert_eq!(parse_vector_backend("memory").unwrap(), VectorBackend::Memory);
        assert_eq!(parse_vector_backend("chroma").unwrap(), VectorBackend::Chroma);
    }

    #[test]
    fn test_parse_vector_backend_rejects_unknown() {
        assert!(parse_vector_backend("pinecone").is_err());
    }
}
