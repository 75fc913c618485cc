//! Matching engine: embeds a query, searches the opposite collection,
//! normalizes distances into scores, resolves surviving ids to rows, and
//! attaches generated explanations to the ranked result.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::candidates;
use crate::embedding;
use crate::errors::AppError;
use crate::jobs;
use crate::llm_client::{strip_json_fences, AiClient, LlmError, TaskType};
use crate::matching::prompts::EXPLANATION_PROMPT;
use crate::models::job::JobRow;
use crate::resumes;
use crate::vector::{VectorStore, COLLECTION_JOBS, COLLECTION_RESUMES};

const EXPLANATION_TEMPERATURE: f32 = 0.3;
const EXPLANATION_FALLBACK: &str = "No explanation available.";

#[derive(Debug, Clone, Serialize)]
pub struct CandidateMatch {
    pub candidate_id: Uuid,
    pub resume_id: Uuid,
    pub candidate_name: String,
    pub score: f32,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub job_id: Uuid,
    pub job_title: String,
    pub score: f32,
    pub explanation: String,
}

struct ScoredCandidate {
    candidate_id: Uuid,
    resume_id: Uuid,
    candidate_name: String,
    score: f32,
    resume_text: String,
}

struct ScoredJob {
    job_id: Uuid,
    job_title: String,
    score: f32,
    job_text: String,
}

/// Converts cosine distance [0, 2] to a similarity score [0, 1].
/// Distance 0 maps to 1.0, distance 2 to 0.0; out-of-range inputs clamp.
pub fn distance_to_score(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}

fn round_score(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

/// Query text for a job: title, description, requirements.
fn job_query_text(job: &JobRow) -> String {
    format!(
        "{}\n{}\n{}",
        job.title,
        job.description.as_deref().unwrap_or_default(),
        job.requirements.as_deref().unwrap_or_default()
    )
}

/// Sorts descending by score and truncates to `limit`.
fn rank_matches<T>(mut matches: Vec<T>, limit: usize, score: impl Fn(&T) -> f32) -> Vec<T> {
    matches.sort_by(|a, b| score(b).total_cmp(&score(a)));
    matches.truncate(limit);
    matches
}

/// Repairs a raw explanation response into exactly `expected` strings:
/// missing entries are padded with a fixed fallback, excess entries are
/// truncated, and non-JSON/non-array responses degrade to all-fallback.
fn parse_explanations(raw: Option<&str>, expected: usize) -> Vec<String> {
    let parsed: Option<Vec<String>> =
        raw.and_then(|text| serde_json::from_str(strip_json_fences(text)).ok());

    match parsed {
        Some(mut explanations) => {
            explanations.resize(expected, EXPLANATION_FALLBACK.to_string());
            explanations
        }
        None => vec![EXPLANATION_FALLBACK.to_string(); expected],
    }
}

/// One generation call explaining every match against the reference.
/// An empty match list short-circuits without calling the service.
async fn generate_explanations(
    ai: &dyn AiClient,
    reference_text: &str,
    match_texts: &[String],
    match_labels: &[String],
) -> Result<Vec<String>, LlmError> {
    if match_texts.is_empty() {
        return Ok(Vec::new());
    }

    let mut matches_block = String::new();
    for (label, text) in match_labels.iter().zip(match_texts) {
        matches_block.push_str(&format!("\n--- {label} ---\n{text}\n"));
    }

    let prompt = EXPLANATION_PROMPT
        .replace("{reference_text}", reference_text)
        .replace("{matches_block}", &matches_block);

    let raw = ai.generate_json(&prompt, EXPLANATION_TEMPERATURE).await?;
    Ok(parse_explanations(raw.as_deref(), match_texts.len()))
}

/// Finds the best-matching candidates for a job.
pub async fn match_candidates_to_job(
    db: &PgPool,
    ai: &dyn AiClient,
    vector_store: &dyn VectorStore,
    job: &JobRow,
    limit: usize,
    min_score: f32,
) -> Result<Vec<CandidateMatch>, AppError> {
    let job_text = job_query_text(job);
    let query_embedding = embedding::generate_embedding(ai, &job_text, TaskType::RetrievalQuery)
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;

    // Over-fetch to tolerate min-score filtering and stale index entries.
    let results = vector_store
        .search(COLLECTION_RESUMES, &query_embedding, limit * 2)
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;
    if results.is_empty() {
        return Ok(Vec::new());
    }

    let mut matches: Vec<ScoredCandidate> = Vec::new();
    for hit in results {
        let score = distance_to_score(hit.distance);
        if score < min_score {
            continue;
        }

        // Entries whose backing rows are gone are stale; skip silently.
        let Ok(resume_id) = hit.id.parse::<Uuid>() else {
            continue;
        };
        let Some(resume) = resumes::service::get_resume(db, resume_id).await? else {
            continue;
        };
        let Some(candidate) =
            candidates::service::get_candidate(db, resume.candidate_id).await?
        else {
            continue;
        };

        matches.push(ScoredCandidate {
            candidate_id: candidate.id,
            resume_id: resume.id,
            candidate_name: candidate.full_name(),
            score,
            resume_text: resume.extracted_text.unwrap_or_default(),
        });
    }

    let matches = rank_matches(matches, limit, |m| m.score);
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = matches.iter().map(|m| m.resume_text.clone()).collect();
    let labels: Vec<String> = matches.iter().map(|m| m.candidate_name.clone()).collect();
    let explanations = generate_explanations(ai, &job_text, &texts, &labels)
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;

    Ok(matches
        .into_iter()
        .zip(explanations)
        .map(|(m, explanation)| CandidateMatch {
            candidate_id: m.candidate_id,
            resume_id: m.resume_id,
            candidate_name: m.candidate_name,
            score: round_score(m.score),
            explanation,
        })
        .collect())
}

/// Finds the best-matching jobs for a candidate, using the most recent
/// resume with extracted text as the query source. No such resume means an
/// empty result without any service calls.
pub async fn match_jobs_to_candidate(
    db: &PgPool,
    ai: &dyn AiClient,
    vector_store: &dyn VectorStore,
    candidate_id: Uuid,
    limit: usize,
    min_score: f32,
) -> Result<Vec<JobMatch>, AppError> {
    let resumes = resumes::service::list_resumes_for_candidate(db, candidate_id).await?;
    let Some(resume) = resumes.into_iter().find(|r| r.has_extracted_text()) else {
        return Ok(Vec::new());
    };
    let resume_text = resume.extracted_text.unwrap_or_default();

    let query_embedding =
        embedding::generate_embedding(ai, &resume_text, TaskType::RetrievalQuery)
            .await
            .map_err(|e| AppError::AiService(e.to_string()))?;

    let results = vector_store
        .search(COLLECTION_JOBS, &query_embedding, limit * 2)
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;
    if results.is_empty() {
        return Ok(Vec::new());
    }

    let mut matches: Vec<ScoredJob> = Vec::new();
    for hit in results {
        let score = distance_to_score(hit.distance);
        if score < min_score {
            continue;
        }

        let Ok(job_id) = hit.id.parse::<Uuid>() else {
            continue;
        };
        let Some(job) = jobs::service::get_job(db, job_id).await? else {
            continue;
        };

        matches.push(ScoredJob {
            job_id: job.id,
            job_title: job.title.clone(),
            score,
            job_text: job_query_text(&job),
        });
    }

    let matches = rank_matches(matches, limit, |m| m.score);
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = matches.iter().map(|m| m.job_text.clone()).collect();
    let labels: Vec<String> = matches.iter().map(|m| m.job_title.clone()).collect();
    let explanations = generate_explanations(ai, &resume_text, &texts, &labels)
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;

    Ok(matches
        .into_iter()
        .zip(explanations)
        .map(|(m, explanation)| JobMatch {
            job_id: m.job_id,
            job_title: m.job_title,
            score: round_score(m.score),
            explanation,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubAi {
        response: Option<String>,
        generate_calls: AtomicUsize,
    }

    impl StubAi {
        fn returning(response: Option<&str>) -> Self {
            Self {
                response: response.map(String::from),
                generate_calls: AtomicUsize::new(0),
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
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn generate_structured_json(
            &self,
            _prompt: &str,
            _schema: Value,
            _temperature: f32,
        ) -> Result<Option<String>, LlmError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn embed(&self, _text: &str, _task_type: TaskType) -> Result<Vec<f32>, LlmError> {
            Ok(vec![1.0, 0.0])
        }
    }

    #[test]
    fn test_distance_to_score_boundary_values() {
        assert_eq!(distance_to_score(0.0), 1.0);
        assert_eq!(distance_to_score(2.0), 0.0);
        assert_eq!(distance_to_score(1.0), 0.5);
    }

    #[test]
    fn test_distance_to_score_clamps_out_of_range() {
        assert_eq!(distance_to_score(3.0), 0.0);
        assert_eq!(distance_to_score(-0.5), 1.0);
    }

    #[test]
    fn test_distance_to_score_small_distance() {
        let score = distance_to_score(0.2);
        assert!(score > 0.89 && score < 0.91, "expected ~0.9, got {score}");
    }

    #[test]
    fn test_round_score_four_decimals() {
        assert_eq!(round_score(0.123_456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
    }

    #[test]
    fn test_rank_matches_sorts_descending_and_truncates() {
        let ranked = rank_matches(vec![0.2_f32, 0.9, 0.5], 2, |s| *s);
        assert_eq!(ranked, vec![0.9, 0.5]);
    }

    #[test]
    fn test_parse_explanations_exact_length_passes_through() {
        let raw = r#"["first", "second"]"#;
        assert_eq!(parse_explanations(Some(raw), 2), vec!["first", "second"]);
    }

    #[test]
    fn test_parse_explanations_pads_short_responses() {
        let explanations = parse_explanations(Some(r#"["only one"]"#), 3);
        assert_eq!(
            explanations,
            vec!["only one", "No explanation available.", "No explanation available."]
        );
    }

    #[test]
    fn test_parse_explanations_truncates_excess() {
        let explanations = parse_explanations(Some(r#"["a", "b", "c"]"#), 2);
        assert_eq!(explanations, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_explanations_invalid_json_is_all_fallback() {
        let explanations = parse_explanations(Some("not json at all"), 2);
        assert_eq!(
            explanations,
            vec!["No explanation available.", "No explanation available."]
        );
    }

    #[test]
    fn test_parse_explanations_non_array_is_all_fallback() {
        let explanations = parse_explanations(Some(r#"{"oops": "object"}"#), 1);
        assert_eq!(explanations, vec!["No explanation available."]);
    }

    #[test]
    fn test_parse_explanations_missing_response_is_all_fallback() {
        assert_eq!(parse_explanations(None, 1), vec!["No explanation available."]);
    }

    #[tokio::test]
    async fn test_generate_explanations_empty_input_makes_no_call() {
        let stub = StubAi::returning(Some(r#"["unused"]"#));
        let out = generate_explanations(&stub, "reference", &[], &[]).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(stub.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_explanations_one_call_per_batch() {
        let stub = StubAi::returning(Some(r#"["fits well", "weak overlap"]"#));
        let texts = vec!["resume a".to_string(), "resume b".to_string()];
        let labels = vec!["Ada".to_string(), "Bob".to_string()];

        let out = generate_explanations(&stub, "job text", &texts, &labels)
            .await
            .unwrap();
        assert_eq!(out, vec!["fits well", "weak overlap"]);
        assert_eq!(stub.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_explanations_repairs_malformed_response() {
        let stub = StubAi::returning(Some("totally not json"));
        let texts = vec!["resume a".to_string()];
        let labels = vec!["Ada".to_string()];

        let out = generate_explanations(&stub, "job text", &texts, &labels)
            .await
            .unwrap();
        assert_eq!(out, vec!["No explanation available."]);
    }
}
