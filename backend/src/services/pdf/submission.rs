//! # Submission PDF Service
//!
//! `POST /api/forms/{submission_id}/generate-pdf` renders a stored submission
//! against its template, using the stored values, HTML values and formatting.
//! The attachment is named `{displayName}_{first 8 chars of the submission ID}.pdf`.

use super::pdf_response;
use crate::render::RenderRequest;
use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, Responder};
use log::info;

pub async fn process(state: web::Data<AppState>, submission_id: web::Path<String>) -> impl Responder {
    match submission_pdf(&state, submission_id.into_inner()).await {
        Ok((pdf, filename)) => pdf_response(pdf, &filename),
        Err(e) => e.into_response(),
    }
}

async fn submission_pdf(state: &AppState, submission_id: String) -> Result<(Vec<u8>, String), ApiError> {
    let forms = state.forms.clone();
    let id = submission_id.clone();
    let submission = blocking("Failed to fetch form submission", move || forms.get_by_id(&id))
        .await?
        .ok_or(ApiError::NotFound("Form submission not found"))?;

    let templates = state.templates.clone();
    let template_id = submission.template_id.clone();
    let template = blocking("Failed to fetch template", move || templates.get_by_id(&template_id))
        .await?
        .ok_or(ApiError::NotFound("Template not found"))?;

    let pdf = state
        .renderer
        .render_pdf(&template, &RenderRequest::from_submission(&submission))
        .await
        .map_err(ApiError::from_render)?;
    info!("Generated PDF for submission {} ({} bytes)", submission_id, pdf.len());
    Ok((pdf, attachment_name(&template.display_name, &submission_id)))
}

fn attachment_name(display_name: &str, submission_id: &str) -> String {
    let short: String = submission_id.chars().take(8).collect();
    format!("{}_{}.pdf", display_name, short)
}
