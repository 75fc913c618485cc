use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::candidates;
use crate::embedding;
use crate::errors::AppError;
use crate::extraction::{self, SUPPORTED_EXTENSIONS};
use crate::models::resume::{ResumeRow, StageStatus};
use crate::pipeline;
use crate::resumes::parser::{self, ParsedResumeData};
use crate::resumes::service::{self, NewResume};
use crate::state::AppState;
use crate::vector::COLLECTION_RESUMES;

#[derive(Debug, Serialize)]
pub struct ResumeTextResponse {
    pub id: Uuid,
    pub extracted_text: Option<String>,
    pub extraction_status: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeParsedResponse {
    pub id: Uuid,
    pub parsed_data: Option<Value>,
    pub parsing_status: String,
    pub parsing_error: Option<String>,
}

/// POST /api/v1/candidates/:id/resumes
///
/// Upload succeeds even when extraction fails; the failure lands on the
/// resume's extraction status instead. The parse/embed pipeline only runs in
/// the background when extraction produced text.
pub async fn upload_resume(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    candidates::service::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::not_found("Candidate", candidate_id))?;

    let (original_filename, content_type, content) = read_upload_field(&mut multipart).await?;

    // Validate before any storage write.
    let ext = file_extension(&original_filename);
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::Validation(format!(
            "File type '{ext}' not allowed. Allowed: {}",
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }
    if content.len() as u64 > state.config.max_upload_bytes() {
        return Err(AppError::Validation(format!(
            "File size exceeds maximum of {}MB",
            state.config.max_upload_size_mb
        )));
    }

    let stored_filename = format!("{}{ext}", Uuid::new_v4());
    let file_path = state
        .storage
        .save(&content, &stored_filename, &candidate_id.to_string())
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let resume = service::create_resume(
        &state.db,
        NewResume {
            candidate_id,
            original_filename: &original_filename,
            stored_filename: &stored_filename,
            file_path: &file_path,
            content_type: &content_type,
            file_size_bytes: content.len() as i64,
        },
    )
    .await?;

    let resume = run_extraction(&state, &resume).await?;

    if resume.extraction_status == StageStatus::Completed.as_str() && resume.has_extracted_text() {
        pipeline::spawn_resume_pipeline(&state, resume.id);
    }

    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/candidates/:id/resumes
pub async fn list_resumes(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    candidates::service::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::not_found("Candidate", candidate_id))?;

    let resumes = service::list_resumes_for_candidate(&state.db, candidate_id).await?;
    Ok(Json(resumes))
}

/// GET /api/v1/resumes/:id
pub async fn get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;
    Ok(Json(resume))
}

/// GET /api/v1/resumes/:id/download
pub async fn download_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;

    let abs_path = state
        .storage
        .retrieve(&resume.file_path)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let content = tokio::fs::read(&abs_path)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, resume.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", resume.original_filename),
        ),
    ];
    Ok((headers, content).into_response())
}

/// POST /api/v1/resumes/:id/extract
///
/// Re-runs extraction and records the outcome; like upload, a failed
/// extraction is reported through status rather than an error response.
pub async fn re_extract_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;

    let resume = run_extraction(&state, &resume).await?;
    Ok(Json(resume))
}

/// GET /api/v1/resumes/:id/text
pub async fn get_resume_text(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeTextResponse>, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;

    Ok(Json(ResumeTextResponse {
        id: resume.id,
        extracted_text: resume.extracted_text,
        extraction_status: resume.extraction_status,
    }))
}

/// POST /api/v1/resumes/:id/parse
///
/// Synchronous parse trigger. The outcome is recorded on the resume either
/// way; failures additionally surface to the caller as AI-service errors.
pub async fn parse_resume_endpoint(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;

    if !resume.has_extracted_text() {
        return Err(AppError::Precondition(
            "Resume has no extracted text. Run extraction first.".to_string(),
        ));
    }
    let text = resume.extracted_text.as_deref().unwrap_or_default();

    match parser::parse_resume(state.ai.as_ref(), text).await {
        Ok(parsed) => {
            let payload = serde_json::to_value(&parsed).map_err(|e| AppError::Internal(e.into()))?;
            let refreshed = service::mark_parsing_completed(&state.db, resume.id, &payload).await?;
            Ok(Json(refreshed))
        }
        Err(e) => {
            service::mark_parsing_failed(&state.db, resume.id, &e.to_string()).await?;
            Err(AppError::AiService(e.to_string()))
        }
    }
}

/// GET /api/v1/resumes/:id/parsed
pub async fn get_parsed_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeParsedResponse>, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;

    Ok(Json(ResumeParsedResponse {
        id: resume.id,
        parsed_data: resume.parsed_data,
        parsing_status: resume.parsing_status,
        parsing_error: resume.parsing_error,
    }))
}

/// POST /api/v1/resumes/:id/embed
///
/// Synchronous embed trigger; requires parsed data, since resume embeddings
/// derive from the structured fields rather than raw text.
pub async fn embed_resume_endpoint(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;

    let Some(parsed_data) = resume.parsed_data.clone() else {
        return Err(AppError::Precondition(
            "Resume has no parsed data. Run parsing first.".to_string(),
        ));
    };
    let parsed: ParsedResumeData =
        serde_json::from_value(parsed_data).map_err(|e| AppError::Internal(e.into()))?;

    let vector = embedding::embed_resume(state.ai.as_ref(), &parsed)
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;

    state
        .vector_store
        .upsert(
            COLLECTION_RESUMES,
            &resume_id.to_string(),
            resume.extracted_text.as_deref().unwrap_or_default(),
            &vector,
            json!({"candidate_id": resume.candidate_id}),
        )
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;

    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
pub async fn delete_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let resume = service::get_resume(&state.db, resume_id)
        .await?
        .ok_or_else(|| AppError::not_found("Resume", resume_id))?;

    if state.storage.exists(&resume.file_path).await {
        state
            .storage
            .delete(&resume.file_path)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
    }

    // Best-effort index cleanup; the relational delete must still succeed.
    if let Err(e) = state
        .vector_store
        .delete(COLLECTION_RESUMES, &resume_id.to_string())
        .await
    {
        debug!("Vector store cleanup for resume {resume_id} skipped: {e}");
    }

    service::delete_resume(&state.db, resume_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reads the `file` multipart field: (filename, content type, bytes).
async fn read_upload_field(multipart: &mut Multipart) -> Result<(String, String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Validation("Filename is required".to_string()))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        return Ok((filename, content_type, content));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// Lower-cased extension with leading dot, or empty when absent.
fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Runs extraction for a stored resume file and records the outcome.
/// Storage and extraction failures both land on the extraction status.
async fn run_extraction(state: &AppState, resume: &ResumeRow) -> Result<ResumeRow, AppError> {
    let outcome = match state.storage.retrieve(&resume.file_path).await {
        Ok(abs_path) => extraction::extract_text_async(abs_path)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    let refreshed = match outcome {
        Ok(text) => service::mark_extraction_completed(&state.db, resume.id, &text).await?,
        Err(error) => service::mark_extraction_failed(&state.db, resume.id, &error).await?,
    };
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension_is_lowercased_with_dot() {
        assert_eq!(file_extension("Resume.PDF"), ".pdf");
        assert_eq!(file_extension("cv.docx"), ".docx");
        assert_eq!(file_extension("notes.txt"), ".txt");
    }

    #[test]
    fn test_file_extension_missing_is_empty() {
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_supported_extensions_match_upload_allow_list() {
        for ext in [".pdf", ".docx", ".txt"] {
            assert!(SUPPORTED_EXTENSIONS.contains(&ext));
        }
        assert!(!SUPPORTED_EXTENSIONS.contains(&".png"));
    }
}
