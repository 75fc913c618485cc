#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CandidateRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Hiring funnel position of a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    #[default]
    New,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::New => "new",
            CandidateStatus::Screening => "screening",
            CandidateStatus::Interview => "interview",
            CandidateStatus::Offer => "offer",
            CandidateStatus::Hired => "hired",
            CandidateStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_uses_snake_case() {
        let status: CandidateStatus = serde_json::from_str(r#""screening""#).unwrap();
        assert_eq!(status, CandidateStatus::Screening);
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""screening""#);
    }

    #[test]
    fn test_status_default_is_new() {
        assert_eq!(CandidateStatus::default().as_str(), "new");
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        assert!(serde_json::from_str::<CandidateStatus>(r#""archived""#).is_err());
    }

    #[test]
    fn test_full_name_joins_first_and_last() {
        let row = CandidateRow {
            id: Uuid::new_v4(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: None,
            status: "new".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(row.full_name(), "Jane Doe");
    }
}
