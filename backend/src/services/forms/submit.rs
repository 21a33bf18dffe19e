//! # Form Submit Service
//!
//! `POST /api/forms/submit` stores a filled-in form under a fresh UUID. The
//! owning template is not checked; submissions outlive their templates.

use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use common::model::submission::{FormSubmission, DEFAULT_SUBMISSION_STATUS};
use common::requests::SubmitFormRequest;
use log::info;
use serde_json::json;
use uuid::Uuid;

/// # Returns
/// - `201 Created` with `{"id", "message", "status"}`.
/// - `400 Bad Request` when `templateId` is blank.
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<SubmitFormRequest>,
) -> impl Responder {
    match submit_form(&state, payload.into_inner()).await {
        Ok(submission) => HttpResponse::Created().json(json!({
            "id": submission.id,
            "message": "Form submitted successfully",
            "status": submission.status,
        })),
        Err(e) => e.into_response(),
    }
}

async fn submit_form(state: &AppState, request: SubmitFormRequest) -> Result<FormSubmission, ApiError> {
    if request.template_id.trim().is_empty() {
        return Err(ApiError::BadRequest("templateId is required".to_string()));
    }

    let now = Utc::now();
    let status = if request.status.trim().is_empty() {
        DEFAULT_SUBMISSION_STATUS.to_string()
    } else {
        request.status
    };
    let submission = FormSubmission {
        id: Uuid::new_v4().to_string(),
        template_id: request.template_id,
        form_data: request.form_data,
        formatting_data: request.formatting_data,
        html_data: request.html_data,
        status,
        created_at: now,
        updated_at: now,
    };

    let store = state.forms.clone();
    let stored = submission.clone();
    blocking("Failed to save form submission", move || store.create(&stored)).await?;
    info!("Form {} submitted for template {}", submission.id, submission.template_id);
    Ok(submission)
}
