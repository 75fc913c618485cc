/// AI client: the single point of entry for all Generative Language API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All generation and embedding traffic MUST go through this module, and all
/// consumers depend on the `AiClient` trait so tests and alternative vendors
/// can swap the backend without touching call sites.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_OUTPUT_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("embedding response contained no vector")]
    MissingEmbedding,
}

/// Embedding task-type hint: content being indexed vs. content used to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            TaskType::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

/// The generative-text and embedding service contract consumed by the
/// parser, the matching engine, and the pipeline.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// JSON-mode generation without a schema constraint.
    /// Returns `None` when the model produced no text.
    async fn generate_json(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<Option<String>, LlmError>;

    /// JSON-mode generation constrained to a response schema.
    async fn generate_structured_json(
        &self,
        prompt: &str,
        schema: Value,
        temperature: f32,
    ) -> Result<Option<String>, LlmError>;

    /// Embeds exactly one text into exactly one vector.
    async fn embed(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<ResponseCandidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GenerateResponse {
    /// Extracts the text of the first candidate, treating empty text as absent.
    fn into_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|p| p.text)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    content: Content<'a>,
    #[serde(rename = "taskType")]
    task_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini-backed implementation of `AiClient` over the REST API.
///
/// Makes exactly one attempt per call: failed calls are recorded or surfaced
/// by the caller, and retries happen by re-invoking the trigger endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    embedding_model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, embedding_model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
            embedding_model,
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        schema: Option<Value>,
        temperature: f32,
    ) -> Result<Option<String>, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let url = format!("{GEMINI_API_BASE}/models/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response.json().await?;

        if let Some(usage) = &generated.usage_metadata {
            debug!(
                "Generation call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(generated.into_text())
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn generate_json(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<Option<String>, LlmError> {
        self.generate(prompt, None, temperature).await
    }

    async fn generate_structured_json(
        &self,
        prompt: &str,
        schema: Value,
        temperature: f32,
    ) -> Result<Option<String>, LlmError> {
        self.generate(prompt, Some(schema), temperature).await
    }

    async fn embed(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>, LlmError> {
        let request_body = EmbedRequest {
            content: Content {
                parts: vec![Part { text }],
            },
            task_type: task_type.as_str(),
        };

        let url = format!(
            "{GEMINI_API_BASE}/models/{}:embedContent",
            self.embedding_model
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let embedded: EmbedResponse = response.json().await?;
        let values = embedded
            .embedding
            .map(|e| e.values)
            .filter(|v| !v.is_empty())
            .ok_or(LlmError::MissingEmbedding)?;

        Ok(values)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_task_type_wire_values() {
        assert_eq!(TaskType::RetrievalDocument.as_str(), "RETRIEVAL_DOCUMENT");
        assert_eq!(TaskType::RetrievalQuery.as_str(), "RETRIEVAL_QUERY");
    }

    #[test]
    fn test_generate_response_extracts_first_text_part() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"ok\": true}"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5}
        }"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("{\"ok\": true}"));
    }

    #[test]
    fn test_generate_response_empty_text_is_none() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": ""}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text(), None);
    }

    #[test]
    fn test_generate_response_no_candidates_is_none() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.into_text(), None);
    }
}
