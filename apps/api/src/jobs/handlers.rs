use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::embedding;
use crate::errors::AppError;
use crate::jobs::service;
use crate::models::job::{EmploymentType, JobRow};
use crate::models::{validate_pagination, PaginatedResponse};
use crate::pipeline;
use crate::state::AppState;
use crate::vector::COLLECTION_JOBS;

#[derive(Debug, Deserialize)]
pub struct JobCreate {
    pub title: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub is_active: Option<bool>,
}

impl JobUpdate {
    /// True when a field feeding the job embedding changed.
    fn touches_embedding_text(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.requirements.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub is_active: Option<bool>,
}

/// POST /api/v1/jobs
pub async fn create_job(
    State(state): State<AppState>,
    Json(data): Json<JobCreate>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let job = service::create_job(&state.db, &data).await?;

    // Embed in the background; failures are logged by the pipeline.
    pipeline::spawn_job_pipeline(&state, job.id);

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<PaginatedResponse<JobRow>>, AppError> {
    let (skip, limit) = validate_pagination(query.skip, query.limit)?;

    let (items, total) = service::list_jobs(&state.db, skip, limit, query.is_active).await?;
    Ok(Json(PaginatedResponse {
        items,
        total,
        skip,
        limit,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = service::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Job", job_id))?;
    Ok(Json(job))
}

/// PATCH /api/v1/jobs/:id
pub async fn update_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(data): Json<JobUpdate>,
) -> Result<Json<JobRow>, AppError> {
    service::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Job", job_id))?;

    let updated = service::update_job(&state.db, job_id, &data).await?;

    if data.touches_embedding_text() {
        pipeline::spawn_job_pipeline(&state, updated.id);
    }

    Ok(Json(updated))
}

/// POST /api/v1/jobs/:id/embed
///
/// Synchronous trigger: unlike the background pipeline, AI failures here
/// surface to the caller.
pub async fn embed_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = service::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Job", job_id))?;

    let vector = embedding::embed_job(
        state.ai.as_ref(),
        &job.title,
        job.description.as_deref(),
        job.requirements.as_deref(),
    )
    .await
    .map_err(|e| AppError::AiService(e.to_string()))?;

    let text = format!(
        "{} {} {}",
        job.title,
        job.description.as_deref().unwrap_or_default(),
        job.requirements.as_deref().unwrap_or_default()
    );
    state
        .vector_store
        .upsert(
            COLLECTION_JOBS,
            &job_id.to_string(),
            &text,
            &vector,
            json!({"is_active": job.is_active}),
        )
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;

    Ok(Json(job))
}

/// DELETE /api/v1/jobs/:id
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Job", job_id))?;

    // Best-effort index cleanup; the relational delete must still succeed.
    if let Err(e) = state
        .vector_store
        .delete(COLLECTION_JOBS, &job_id.to_string())
        .await
    {
        debug!("Vector store cleanup for job {job_id} skipped: {e}");
    }

    service::delete_job(&state.db, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
