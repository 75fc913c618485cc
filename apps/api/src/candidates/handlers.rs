use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::candidates::service;
use crate::errors::{is_unique_violation, AppError};
use crate::models::candidate::{CandidateRow, CandidateStatus};
use crate::models::{validate_pagination, PaginatedResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CandidateCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<CandidateStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<CandidateStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<CandidateStatus>,
}

/// POST /api/v1/candidates
pub async fn create_candidate(
    State(state): State<AppState>,
    Json(data): Json<CandidateCreate>,
) -> Result<(StatusCode, Json<CandidateRow>), AppError> {
    let candidate = service::create_candidate(&state.db, &data)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "A candidate with email '{}' already exists",
                    data.email
                ))
            } else {
                AppError::Database(e)
            }
        })?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /api/v1/candidates
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<Json<PaginatedResponse<CandidateRow>>, AppError> {
    let (skip, limit) = validate_pagination(query.skip, query.limit)?;
    let status = query.status.map(|s| s.as_str());

    let (items, total) = service::list_candidates(&state.db, skip, limit, status).await?;
    Ok(Json(PaginatedResponse {
        items,
        total,
        skip,
        limit,
    }))
}

/// GET /api/v1/candidates/:id
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    let candidate = service::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::not_found("Candidate", candidate_id))?;
    Ok(Json(candidate))
}

/// PATCH /api/v1/candidates/:id
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(data): Json<CandidateUpdate>,
) -> Result<Json<CandidateRow>, AppError> {
    service::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::not_found("Candidate", candidate_id))?;

    let updated = service::update_candidate(&state.db, candidate_id, &data)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "A candidate with email '{}' already exists",
                    data.email.as_deref().unwrap_or_default()
                ))
            } else {
                AppError::Database(e)
            }
        })?;
    Ok(Json(updated))
}

/// DELETE /api/v1/candidates/:id
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::not_found("Candidate", candidate_id))?;

    service::delete_candidate(&state.db, candidate_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
