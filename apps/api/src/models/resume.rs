#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored resume file and its two processing tracks.
///
/// Extraction and parsing carry independent status/error columns: a parsing
/// failure never reverts extraction state, and vice versa.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub extracted_text: Option<String>,
    pub extraction_status: String,
    pub extraction_error: Option<String>,
    pub parsed_data: Option<Value>,
    pub parsed_at: Option<DateTime<Utc>>,
    pub parsing_status: String,
    pub parsing_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// True when extraction produced non-empty text, the precondition for parsing.
    pub fn has_extracted_text(&self) -> bool {
        self.extracted_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Status of one pipeline stage (extraction or parsing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl StageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Completed => "completed",
            StageStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(extracted_text: Option<&str>) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            original_filename: "resume.pdf".to_string(),
            stored_filename: "stored.pdf".to_string(),
            file_path: "sub/stored.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            file_size_bytes: 1024,
            extracted_text: extracted_text.map(String::from),
            extraction_status: "pending".to_string(),
            extraction_error: None,
            parsed_data: None,
            parsed_at: None,
            parsing_status: "pending".to_string(),
            parsing_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_extracted_text_requires_non_empty() {
        assert!(!make_row(None).has_extracted_text());
        assert!(!make_row(Some("")).has_extracted_text());
        assert!(make_row(Some("some text")).has_extracted_text());
    }

    #[test]
    fn test_stage_status_serde_round_trip() {
        let status: StageStatus = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(status, StageStatus::Completed);
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""completed""#);
    }

    #[test]
    fn test_stage_status_default_is_pending() {
        assert_eq!(StageStatus::default(), StageStatus::Pending);
    }
}
