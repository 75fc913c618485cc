use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidates;
use crate::errors::AppError;
use crate::jobs;
use crate::matching::engine::{self, CandidateMatch, JobMatch};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub limit: Option<usize>,
    pub min_score: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct CandidateMatchResults {
    pub job_id: Uuid,
    pub matches: Vec<CandidateMatch>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct JobMatchResults {
    pub candidate_id: Uuid,
    pub matches: Vec<JobMatch>,
    pub total: usize,
}

fn validate_match_query(query: &MatchQuery) -> Result<(usize, f32), AppError> {
    let limit = query.limit.unwrap_or(10);
    if !(1..=50).contains(&limit) {
        return Err(AppError::Validation(
            "limit must be between 1 and 50".to_string(),
        ));
    }

    let min_score = query.min_score.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&min_score) {
        return Err(AppError::Validation(
            "min_score must be between 0.0 and 1.0".to_string(),
        ));
    }

    Ok((limit, min_score))
}

/// GET /api/v1/matching/jobs/:job_id/candidates
pub async fn candidates_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<CandidateMatchResults>, AppError> {
    let (limit, min_score) = validate_match_query(&query)?;

    let job = jobs::service::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Job", job_id))?;

    let matches = engine::match_candidates_to_job(
        &state.db,
        state.ai.as_ref(),
        state.vector_store.as_ref(),
        &job,
        limit,
        min_score,
    )
    .await?;

    Ok(Json(CandidateMatchResults {
        job_id,
        total: matches.len(),
        matches,
    }))
}

/// GET /api/v1/matching/candidates/:candidate_id/jobs
pub async fn jobs_for_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<JobMatchResults>, AppError> {
    let (limit, min_score) = validate_match_query(&query)?;

    candidates::service::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::not_found("Candidate", candidate_id))?;

    let matches = engine::match_jobs_to_candidate(
        &state.db,
        state.ai.as_ref(),
        state.vector_store.as_ref(),
        candidate_id,
        limit,
        min_score,
    )
    .await?;

    Ok(Json(JobMatchResults {
        candidate_id,
        total: matches.len(),
        matches,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query_defaults() {
        let query = MatchQuery {
            limit: None,
            min_score: None,
        };
        assert_eq!(validate_match_query(&query).unwrap(), (10, 0.0));
    }

    #[test]
    fn test_match_query_rejects_limit_out_of_range() {
        for limit in [0, 51] {
            let query = MatchQuery {
                limit: Some(limit),
                min_score: None,
            };
            assert!(validate_match_query(&query).is_err());
        }
    }

    #[test]
    fn test_match_query_rejects_min_score_out_of_range() {
        for min_score in [-0.1, 1.1] {
            let query = MatchQuery {
                limit: None,
                min_score: Some(min_score),
            };
            assert!(validate_match_query(&query).is_err());
        }
    }
}
