//! Resume parsing: turns extracted text into a structured record via the
//! generative model. Exactly one outbound call per invocation.

use serde::{Deserialize, Serialize};

use crate::llm_client::{strip_json_fences, AiClient, LlmError};
use crate::resumes::prompts::{parsed_resume_schema, PARSE_PROMPT};

const PARSE_TEMPERATURE: f32 = 0.1;

/// Structured resume data as returned by the model. Every field defaults so
/// that fields the model could not find deserialize as None or empty-list
/// instead of failing validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResumeData {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    pub company: String,
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub year: Option<String>,
}

/// Sends extracted text to the generative model and returns structured data.
///
/// An empty model response yields the all-default record (not an error); a
/// malformed response surfaces as `LlmError::Parse` for the caller to handle.
pub async fn parse_resume(
    ai: &dyn AiClient,
    extracted_text: &str,
) -> Result<ParsedResumeData, LlmError> {
    let prompt = PARSE_PROMPT.replace("{text}", extracted_text);
    let raw = ai
        .generate_structured_json(&prompt, parsed_resume_schema(), PARSE_TEMPERATURE)
        .await?;

    let Some(raw) = raw else {
        return Ok(ParsedResumeData::default());
    };

    serde_json::from_str(strip_json_fences(&raw)).map_err(LlmError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::llm_client::TaskType;

    /// Stub that returns a canned generation response and counts calls.
    struct StubAi {
        response: Option<String>,
        calls: AtomicUsize,
    }

    impl StubAi {
        fn returning(response: Option<&str>) -> Self {
            Self {
                response: response.map(String::from),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AiClient for StubAi {
        async fn generate_json(
            &self,
            _prompt: &str,
            _temperature: f32,
        ) -> Result<Option<String>, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn generate_structured_json(
            &self,
            _prompt: &str,
            _schema: Value,
            _temperature: f32,
        ) -> Result<Option<String>, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn embed(&self, _text: &str, _task_type: TaskType) -> Result<Vec<f32>, LlmError> {
            unreachable!("parser must not embed")
        }
    }

    #[tokio::test]
    async fn test_parse_resume_deserializes_model_output() {
        let stub = StubAi::returning(Some(r#"{"full_name": "John Doe", "skills": ["Python"]}"#));
        let parsed = parse_resume(&stub, "John Doe, Python developer").await.unwrap();

        assert_eq!(parsed.full_name.as_deref(), Some("John Doe"));
        assert_eq!(parsed.skills, vec!["Python"]);
        assert!(parsed.experience.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parse_resume_empty_response_yields_default_record() {
        let stub = StubAi::returning(None);
        let parsed = parse_resume(&stub, "some text").await.unwrap();
        assert_eq!(parsed, ParsedResumeData::default());
    }

    #[tokio::test]
    async fn test_parse_resume_malformed_response_is_an_error() {
        let stub = StubAi::returning(Some("this is not json"));
        let err = parse_resume(&stub, "some text").await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_parse_resume_strips_code_fences() {
        let stub = StubAi::returning(Some("```json\n{\"full_name\": \"Ada\"}\n```"));
        let parsed = parse_resume(&stub, "Ada").await.unwrap();
        assert_eq!(parsed.full_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_parsed_resume_tolerates_missing_and_null_fields() {
        let parsed: ParsedResumeData =
            serde_json::from_str(r#"{"full_name": null, "email": "a@b.c"}"#).unwrap();
        assert!(parsed.full_name.is_none());
        assert_eq!(parsed.email.as_deref(), Some("a@b.c"));
        assert!(parsed.skills.is_empty());
        assert!(parsed.education.is_empty());
    }
}
