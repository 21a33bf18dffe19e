//! # Form Retrieval Service
//!
//! `GET /api/forms/{submission_id}` and `GET /api/templates/{template_id}/forms`.

use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};

/// # Returns
/// - `200 OK` with the submission.
/// - `404 Not Found` if it does not exist.
pub async fn process(state: web::Data<AppState>, submission_id: web::Path<String>) -> impl Responder {
    let store = state.forms.clone();
    let id = submission_id.into_inner();
    let found = blocking("Failed to fetch form submission", move || store.get_by_id(&id))
        .await
        .and_then(|s| s.ok_or(ApiError::NotFound("Form submission not found")));
    match found {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => e.into_response(),
    }
}

/// Submissions of one template, newest first. Unknown templates yield `[]`.
pub async fn by_template(state: web::Data<AppState>, template_id: web::Path<String>) -> impl Responder {
    let store = state.forms.clone();
    let id = template_id.into_inner();
    match blocking("Failed to fetch form submissions", move || store.get_by_template_id(&id)).await {
        Ok(submissions) => HttpResponse::Ok().json(submissions),
        Err(e) => e.into_response(),
    }
}
