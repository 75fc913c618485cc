//! Background document pipeline: parse → embed → index for resumes, and
//! embed → index for jobs.
//!
//! Pipeline runs are fire-and-forget work spawned off the request path.
//! Every failure is caught at its stage boundary and recorded or logged;
//! nothing here propagates back to a caller.

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use crate::embedding;
use crate::jobs;
use crate::llm_client::AiClient;
use crate::resumes::{self, parser};
use crate::state::AppState;
use crate::vector::{VectorStore, COLLECTION_JOBS, COLLECTION_RESUMES};

/// Full pipeline for one resume. Requires completed extraction with
/// non-empty text; bails silently otherwise. Parsing strictly precedes
/// embedding, and a parsing failure ends the run. An embedding failure is
/// logged without rolling back the persisted parsing result.
pub async fn process_resume_pipeline(
    db: PgPool,
    ai: Arc<dyn AiClient>,
    vector_store: Arc<dyn VectorStore>,
    resume_id: Uuid,
) {
    let resume = match resumes::service::get_resume(&db, resume_id).await {
        Ok(Some(resume)) => resume,
        Ok(None) => return,
        Err(e) => {
            error!("Resume {resume_id} pipeline aborted: {e}");
            return;
        }
    };
    if !resume.has_extracted_text() {
        return;
    }
    let text = resume.extracted_text.clone().unwrap_or_default();

    // Step 1: parse
    let parsed = match parser::parse_resume(ai.as_ref(), &text).await {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Resume {resume_id} parsing failed: {e}");
            if let Err(db_err) =
                resumes::service::mark_parsing_failed(&db, resume_id, &e.to_string()).await
            {
                error!("Resume {resume_id} status update failed: {db_err}");
            }
            return; // don't embed if parsing failed
        }
    };

    let payload = match serde_json::to_value(&parsed) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Resume {resume_id} parsed payload serialization failed: {e}");
            return;
        }
    };
    if let Err(e) = resumes::service::mark_parsing_completed(&db, resume_id, &payload).await {
        error!("Resume {resume_id} status update failed: {e}");
        return;
    }

    // Step 2: embed + index
    match embedding::embed_resume(ai.as_ref(), &parsed).await {
        Ok(vector) => {
            if let Err(e) = vector_store
                .upsert(
                    COLLECTION_RESUMES,
                    &resume_id.to_string(),
                    &text,
                    &vector,
                    json!({"candidate_id": resume.candidate_id}),
                )
                .await
            {
                error!("Resume {resume_id} embedding failed: {e}");
            }
        }
        Err(e) => error!("Resume {resume_id} embedding failed: {e}"),
    }
}

/// Single-step pipeline for a job: embed its fields and upsert the vector.
pub async fn process_job_pipeline(
    db: PgPool,
    ai: Arc<dyn AiClient>,
    vector_store: Arc<dyn VectorStore>,
    job_id: Uuid,
) {
    let job = match jobs::service::get_job(&db, job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return,
        Err(e) => {
            error!("Job {job_id} pipeline aborted: {e}");
            return;
        }
    };

    match embedding::embed_job(
        ai.as_ref(),
        &job.title,
        job.description.as_deref(),
        job.requirements.as_deref(),
    )
    .await
    {
        Ok(vector) => {
            let text = format!(
                "{} {} {}",
                job.title,
                job.description.as_deref().unwrap_or_default(),
                job.requirements.as_deref().unwrap_or_default()
            );
            if let Err(e) = vector_store
                .upsert(
                    COLLECTION_JOBS,
                    &job_id.to_string(),
                    &text,
                    &vector,
                    json!({"is_active": job.is_active}),
                )
                .await
            {
                error!("Job {job_id} embedding failed: {e}");
            }
        }
        Err(e) => error!("Job {job_id} embedding failed: {e}"),
    }
}

/// Hands the resume pipeline off to a background task that outlives the
/// originating request.
pub fn spawn_resume_pipeline(state: &AppState, resume_id: Uuid) {
    let db = state.db.clone();
    let ai = state.ai.clone();
    let vector_store = state.vector_store.clone();
    tokio::spawn(async move {
        debug!("Starting resume pipeline for {resume_id}");
        process_resume_pipeline(db, ai, vector_store, resume_id).await;
    });
}

pub fn spawn_job_pipeline(state: &AppState, job_id: Uuid) {
    let db = state.db.clone();
    let ai = state.ai.clone();
    let vector_store = state.vector_store.clone();
    tokio::spawn(async move {
        debug!("Starting job pipeline for {job_id}");
        process_job_pipeline(db, ai, vector_store, job_id).await;
    });
}
