pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::candidates::handlers as candidate_handlers;
use crate::jobs::handlers as job_handlers;
use crate::matching::handlers as matching_handlers;
use crate::resumes::handlers as resume_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Headroom above the configured file cap covers multipart framing; the
    // exact per-file limit is enforced in the upload handler.
    let body_limit = DefaultBodyLimit::max((state.config.max_upload_bytes() + 1024 * 1024) as usize);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/status", get(health::liveness_handler))
        // Candidates
        .route(
            "/api/v1/candidates",
            post(candidate_handlers::create_candidate).get(candidate_handlers::list_candidates),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidate_handlers::get_candidate)
                .patch(candidate_handlers::update_candidate)
                .delete(candidate_handlers::delete_candidate),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            post(job_handlers::create_job).get(job_handlers::list_jobs),
        )
        .route(
            "/api/v1/jobs/:id",
            get(job_handlers::get_job)
                .patch(job_handlers::update_job)
                .delete(job_handlers::delete_job),
        )
        .route("/api/v1/jobs/:id/embed", post(job_handlers::embed_job))
        // Resumes
        .route(
            "/api/v1/candidates/:id/resumes",
            post(resume_handlers::upload_resume).get(resume_handlers::list_resumes),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resume_handlers::get_resume).delete(resume_handlers::delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/download",
            get(resume_handlers::download_resume),
        )
        .route(
            "/api/v1/resumes/:id/extract",
            post(resume_handlers::re_extract_resume),
        )
        .route("/api/v1/resumes/:id/text", get(resume_handlers::get_resume_text))
        .route(
            "/api/v1/resumes/:id/parse",
            post(resume_handlers::parse_resume_endpoint),
        )
        .route(
            "/api/v1/resumes/:id/parsed",
            get(resume_handlers::get_parsed_resume),
        )
        .route(
            "/api/v1/resumes/:id/embed",
            post(resume_handlers::embed_resume_endpoint),
        )
        // Matching
        .route(
            "/api/v1/matching/jobs/:job_id/candidates",
            get(matching_handlers::candidates_for_job),
        )
        .route(
            "/api/v1/matching/candidates/:candidate_id/jobs",
            get(matching_handlers::jobs_for_candidate),
        )
        .layer(body_limit)
        .with_state(state)
}
