use sqlx::PgPool;
use uuid::Uuid;

use crate::candidates::handlers::{CandidateCreate, CandidateUpdate};
use crate::models::candidate::CandidateRow;

pub async fn create_candidate(
    pool: &PgPool,
    data: &CandidateCreate,
) -> Result<CandidateRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO candidates (first_name, last_name, email, phone, status, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.status.unwrap_or_default().as_str())
    .bind(&data.notes)
    .fetch_one(pool)
    .await
}

pub async fn get_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM candidates WHERE id = $1")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_candidates(
    pool: &PgPool,
    skip: i64,
    limit: i64,
    status: Option<&str>,
) -> Result<(Vec<CandidateRow>, i64), sqlx::Error> {
    let (total, rows) = match status {
        Some(status) => {
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE status = $1")
                    .bind(status)
                    .fetch_one(pool)
                    .await?;
            let rows: Vec<CandidateRow> = sqlx::query_as(
                r#"
                SELECT * FROM candidates
                WHERE status = $1
                ORDER BY created_at DESC
                OFFSET $2 LIMIT $3
                "#,
            )
            .bind(status)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await?;
            (total, rows)
        }
        None => {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
                .fetch_one(pool)
                .await?;
            let rows: Vec<CandidateRow> =
                sqlx::query_as("SELECT * FROM candidates ORDER BY created_at DESC OFFSET $1 LIMIT $2")
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
pub async fn update_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
    data: &CandidateUpdate,
) -> Result<CandidateRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE candidates SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            status = COALESCE($6, status),
            notes = COALESCE($7, notes),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.status.map(|s| s.as_str()))
    .bind(&data.notes)
    .fetch_one(pool)
    .await
}

/// Deletes the candidate; resumes cascade at the database level.
pub async fn delete_candidate(pool: &PgPool, candidate_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(candidate_id)
        .execute(pool)
        .await?;
    Ok(())
}
