//! # PDF Generation Service
//!
//! Backend logic for `POST /api/generate-pdf`.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: The body is a `GeneratePdfRequest`: `templateId`, the `data`
//!     values, and optional `htmlData`, `formattingData` and `customFields`.
//!
//! 2.  **Template Fetching**: The template is loaded with its fields and page
//!     backgrounds. An unknown ID answers `404 Not Found`.
//!
//! 3.  **Rendering**: The request becomes a `RenderRequest`. Custom fields are
//!     added for this render only and never stored.
//!
//! 4.  **HTTP Response**: The PDF bytes are returned with
//!     `Content-Disposition: attachment; filename={templateId}.pdf`.

use super::pdf_response;
use crate::render::RenderRequest;
use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, Responder};
use common::requests::GeneratePdfRequest;
use log::info;

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<GeneratePdfRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let filename = format!("{}.pdf", request.template_id);
    match generate_pdf(&state, request).await {
        Ok(pdf) => pdf_response(pdf, &filename),
        Err(e) => e.into_response(),
    }
}

async fn generate_pdf(state: &AppState, request: GeneratePdfRequest) -> Result<Vec<u8>, ApiError> {
    let store = state.templates.clone();
    let template_id = request.template_id.clone();
    let template = blocking("Failed to fetch template", move || store.get_by_id(&template_id))
        .await?
        .ok_or(ApiError::NotFound("Template not found"))?;

    let custom_fields = request
        .custom_fields
        .into_iter()
        .map(|f| f.into_field())
        .collect();
    let render_request = RenderRequest::from_json(
        request.data,
        &request.html_data,
        &request.formatting_data,
        custom_fields,
    );

    let pdf = state
        .renderer
        .render_pdf(&template, &render_request)
        .await
        .map_err(ApiError::from_render)?;
    info!("Generated PDF for template {} ({} bytes)", template.id, pdf.len());
    Ok(pdf)
}
