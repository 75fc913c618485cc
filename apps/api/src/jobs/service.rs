use sqlx::PgPool;
use uuid::Uuid;

use crate::jobs::handlers::{JobCreate, JobUpdate};
use crate::models::job::JobRow;

pub async fn create_job(pool: &PgPool, data: &JobCreate) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO jobs (title, department, description, requirements, location,
                          employment_type, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&data.title)
    .bind(&data.department)
    .bind(&data.description)
    .bind(&data.requirements)
    .bind(&data.location)
    .bind(data.employment_type.unwrap_or_default().as_str())
    .bind(data.is_active.unwrap_or(true))
    .fetch_one(pool)
    .await
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_jobs(
    pool: &PgPool,
    skip: i64,
    limit: i64,
    is_active: Option<bool>,
) -> Result<(Vec<JobRow>, i64), sqlx::Error> {
    let (total, rows) = match is_active {
        Some(is_active) => {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE is_active = $1")
                .bind(is_active)
                .fetch_one(pool)
                .await?;
            let rows: Vec<JobRow> = sqlx::query_as(
                r#"
                SELECT * FROM jobs
                WHERE is_active = $1
                ORDER BY created_at DESC
                OFFSET $2 LIMIT $3
                "#,
            )
            .bind(is_active)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await?;
            (total, rows)
        }
        None => {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
                .fetch_one(pool)
                .await?;
            let rows: Vec<JobRow> =
                sqlx::query_as("SELECT * FROM jobs ORDER BY created_at DESC OFFSET $1 LIMIT $2")
                    .bind(skip)
                    .bind(limit)
                    .fetch_all(pool)
                    .await?;
            (total, rows)
        }
    };

    Ok((rows, total))
}

/// Partial update: absent fields keep their current values.
pub async fn update_job(
    pool: &PgPool,
    job_id: Uuid,
    data: &JobUpdate,
) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE jobs SET
            title = COALESCE($2, title),
            department = COALESCE($3, department),
            description = COALESCE($4, description),
            requirements = COALESCE($5, requirements),
            location = COALESCE($6, location),
            employment_type = COALESCE($7, employment_type),
            is_active = COALESCE($8, is_active),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(&data.title)
    .bind(&data.department)
    .bind(&data.description)
    .bind(&data.requirements)
    .bind(&data.location)
    .bind(data.employment_type.map(|e| e.as_str()))
    .bind(data.is_active)
    .fetch_one(pool)
    .await
}

pub async fn delete_job(pool: &PgPool, job_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}
