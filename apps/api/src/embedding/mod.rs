//! Embedding generation: builds the text representation of an entity and
//! converts it to a vector through the AI client. Every call passes exactly
//! one text and returns exactly one vector.

use crate::llm_client::{AiClient, LlmError, TaskType};
use crate::resumes::parser::ParsedResumeData;

/// Placeholder used when a parsed resume produces no text parts at all;
/// embedding services reject empty input.
const EMPTY_RESUME_PLACEHOLDER: &str = "No resume data available";

pub async fn generate_embedding(
    ai: &dyn AiClient,
    text: &str,
    task_type: TaskType,
) -> Result<Vec<f32>, LlmError> {
    ai.embed(text, task_type).await
}

/// Builds embedding text from a resume's *parsed* structured fields
/// (never from raw extracted text): summary, skills line, one line per
/// experience entry, one line per education entry.
pub fn build_resume_text(parsed: &ParsedResumeData) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(summary) = parsed.summary.as_deref().filter(|s| !s.is_empty()) {
        parts.push(summary.to_string());
    }

    if !parsed.skills.is_empty() {
        parts.push(format!("Skills: {}", parsed.skills.join(", ")));
    }

    for exp in &parsed.experience {
        let mut line = format!("{} at {}", exp.title, exp.company);
        if let Some(description) = exp.description.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!(" — {description}"));
        }
        parts.push(line);
    }

    for edu in &parsed.education {
        parts.push(format!(
            "{} in {} from {}",
            edu.degree.as_deref().unwrap_or_default(),
            edu.field.as_deref().unwrap_or_default(),
            edu.institution
        ));
    }

    if parts.is_empty() {
        EMPTY_RESUME_PLACEHOLDER.to_string()
    } else {
        parts.join("\n")
    }
}

pub async fn embed_resume(
    ai: &dyn AiClient,
    parsed: &ParsedResumeData,
) -> Result<Vec<f32>, LlmError> {
    let text = build_resume_text(parsed);
    generate_embedding(ai, &text, TaskType::RetrievalDocument).await
}

/// Builds embedding text from a job's own fields; title is the only
/// mandatory part.
pub fn build_job_text(title: &str, description: Option<&str>, requirements: Option<&str>) -> String {
    let mut parts = vec![title.to_string()];
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        parts.push(description.to_string());
    }
    if let Some(requirements) = requirements.filter(|r| !r.is_empty()) {
        parts.push(format!("Requirements: {requirements}"));
    }
    parts.join("\n")
}

pub async fn embed_job(
    ai: &dyn AiClient,
    title: &str,
    description: Option<&str>,
    requirements: Option<&str>,
) -> Result<Vec<f32>, LlmError> {
    let text = build_job_text(title, description, requirements);
    generate_embedding(ai, &text, TaskType::RetrievalDocument).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resumes::parser::{Education, WorkExperience};

    #[test]
    fn test_build_resume_text_includes_all_sections() {
        let parsed = ParsedResumeData {
            summary: Some("S".to_string()),
            skills: vec!["Python".to_string(), "FastAPI".to_string()],
            experience: vec![WorkExperience {
                company: "Acme".to_string(),
                title: "Dev".to_string(),
                description: Some("Built APIs".to_string()),
                ..Default::default()
            }],
            education: vec![Education {
                institution: "MIT".to_string(),
                degree: Some("BS".to_string()),
                field: Some("CS".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let text = build_resume_text(&parsed);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "S",
                "Skills: Python, FastAPI",
                "Dev at Acme — Built APIs",
                "BS in CS from MIT",
            ]
        );
    }

    #[test]
    fn test_build_resume_text_empty_input_uses_placeholder() {
        let text = build_resume_text(&ParsedResumeData::default());
        assert_eq!(text, "No resume data available");
    }

    #[test]
    fn test_build_resume_text_experience_without_description() {
        let parsed = ParsedResumeData {
            experience: vec![WorkExperience {
                company: "Acme".to_string(),
                title: "Dev".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(build_resume_text(&parsed), "Dev at Acme");
    }

    #[test]
    fn test_build_resume_text_skips_empty_summary() {
        let parsed = ParsedResumeData {
            summary: Some(String::new()),
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        assert_eq!(build_resume_text(&parsed), "Skills: Rust");
    }

    #[test]
    fn test_build_job_text_with_all_fields() {
        let text = build_job_text("Engineer", Some("Build things"), Some("Rust"));
        assert_eq!(text, "Engineer\nBuild things\nRequirements: Rust");
    }

    #[test]
    fn test_build_job_text_title_only() {
        assert_eq!(build_job_text("Engineer", None, None), "Engineer");
        assert_eq!(build_job_text("Engineer", Some(""), Some("")), "Engineer");
    }
}
