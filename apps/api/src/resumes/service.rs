use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, StageStatus};

pub struct NewResume<'a> {
    pub candidate_id: Uuid,
    pub original_filename: &'a str,
    pub stored_filename: &'a str,
    pub file_path: &'a str,
    pub content_type: &'a str,
    pub file_size_bytes: i64,
}

pub async fn create_resume(pool: &PgPool, new: NewResume<'_>) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO resumes (candidate_id, original_filename, stored_filename,
                             file_path, content_type, file_size_bytes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(new.candidate_id)
    .bind(new.original_filename)
    .bind(new.stored_filename)
    .bind(new.file_path)
    .bind(new.content_type)
    .bind(new.file_size_bytes)
    .fetch_one(pool)
    .await
}

pub async fn get_resume(pool: &PgPool, resume_id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(resume_id)
        .fetch_optional(pool)
        .await
}

/// All resumes of a candidate, newest first.
pub async fn list_resumes_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE candidate_id = $1 ORDER BY created_at DESC")
        .bind(candidate_id)
        .fetch_all(pool)
        .await
}

/// A fresh successful extraction replaces the text and clears any prior error.
pub async fn mark_extraction_completed(
    pool: &PgPool,
    resume_id: Uuid,
    text: &str,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE resumes SET
            extraction_status = $2,
            extracted_text = $3,
            extraction_error = NULL,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(StageStatus::Completed.as_str())
    .bind(text)
    .fetch_one(pool)
    .await
}

pub async fn mark_extraction_failed(
    pool: &PgPool,
    resume_id: Uuid,
    error: &str,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE resumes SET
            extraction_status = $2,
            extraction_error = $3,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(StageStatus::Failed.as_str())
    .bind(error)
    .fetch_one(pool)
    .await
}

pub async fn mark_parsing_completed(
    pool: &PgPool,
    resume_id: Uuid,
    parsed_data: &Value,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE resumes SET
            parsing_status = $2,
            parsed_data = $3,
            parsed_at = now(),
            parsing_error = NULL,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(StageStatus::Completed.as_str())
    .bind(parsed_data)
    .fetch_one(pool)
    .await
}

pub async fn mark_parsing_failed(
    pool: &PgPool,
    resume_id: Uuid,
    error: &str,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE resumes SET
            parsing_status = $2,
            parsing_error = $3,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(StageStatus::Failed.as_str())
    .bind(error)
    .fetch_one(pool)
    .await
}

pub async fn delete_resume(pool: &PgPool, resume_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(resume_id)
        .execute(pool)
        .await?;
    Ok(())
}
