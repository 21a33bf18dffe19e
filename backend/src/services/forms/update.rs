//! # Form Update Service
//!
//! `PUT /api/forms/{submission_id}` overwrites the parts of a submission the
//! request carries: each map that is present replaces the stored one, and a
//! non-empty status replaces the stored status.

use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use common::model::submission::FormSubmission;
use common::requests::UpdateFormRequest;

pub async fn process(
    state: web::Data<AppState>,
    submission_id: web::Path<String>,
    payload: web::Json<UpdateFormRequest>,
) -> impl Responder {
    match update_form(&state, submission_id.into_inner(), payload.into_inner()).await {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => e.into_response(),
    }
}

async fn update_form(
    state: &AppState,
    submission_id: String,
    request: UpdateFormRequest,
) -> Result<FormSubmission, ApiError> {
    let store = state.forms.clone();
    let updated = blocking("Failed to update form submission", move || {
        let Some(mut submission) = store.get_by_id(&submission_id)? else {
            return Ok(None);
        };
        apply_update(&mut submission, request);
        store.update(&submission)?;
        Ok(Some(submission))
    })
    .await?;
    updated.ok_or(ApiError::NotFound("Form submission not found"))
}

fn apply_update(submission: &mut FormSubmission, request: UpdateFormRequest) {
    if let Some(form_data) = request.form_data {
        submission.form_data = form_data;
    }
    if request.formatting_data.is_some() {
        submission.formatting_data = request.formatting_data;
    }
    if request.html_data.is_some() {
        submission.html_data = request.html_data;
    }
    if !request.status.trim().is_empty() {
        submission.status = request.status;
    }
    submission.updated_at = Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_parts_are_kept() {
        let mut submission: FormSubmission = serde_json::from_value(json!({
            "id": "S1",
            "templateId": "T1",
            "formData": { "name": "Alice" },
            "htmlData": { "name": "<b>Alice</b>" },
            "status": "draft",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let request: UpdateFormRequest = serde_json::from_value(json!({
            "formData": { "name": "Bob" }
        }))
        .unwrap();

        apply_update(&mut submission, request);
        assert_eq!(submission.form_data["name"], json!("Bob"));
        assert_eq!(submission.html_data.unwrap()["name"], json!("<b>Alice</b>"));
        assert_eq!(submission.status, "draft");
    }
}
