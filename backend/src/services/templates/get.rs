//! # Template Retrieval Service
//!
//! Backend logic for `GET /api/templates` and `GET /api/templates/{template_id}`.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: The `process` and `list` functions are the Actix handlers.
//!
//! 2.  **Database Query**: The template store is queried on the blocking pool. Templates
//!     come back hydrated: fields in stored order, page backgrounds in creation order.
//!
//! 3.  **HTTP Response**: Each template is converted into a `TemplateResponse`, whose
//!     `svgFiles[].fileUrl` points at `{base}/api/files/svg/{id}/page/{n}`. The base is
//!     the configured `API_BASE_URL`, or the origin the request arrived on.

use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::responses::TemplateResponse;

/// Actix web handler for the `GET /api/templates/{template_id}` endpoint.
///
/// # Returns
/// - `200 OK` with the `TemplateResponse` as JSON.
/// - `404 Not Found` if no template has this ID.
/// - `500 Internal Server Error` if the database cannot be read.
pub async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<String>,
    req: HttpRequest,
) -> impl Responder {
    match get_template(&state, template_id.into_inner(), &req).await {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => e.into_response(),
    }
}

/// Actix web handler for the `GET /api/templates` endpoint.
pub async fn list(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let store = state.templates.clone();
    match blocking("Failed to fetch templates", move || store.get_all()).await {
        Ok(templates) => {
            let base_url = state.base_url(&req);
            let body: Vec<TemplateResponse> = templates
                .iter()
                .map(|t| TemplateResponse::new(t, &base_url))
                .collect();
            HttpResponse::Ok().json(body)
        }
        Err(e) => e.into_response(),
    }
}

/// Loads one template and shapes it for the client.
///
/// # Arguments
/// * `state` - Shared application state holding the template store.
/// * `template_id` - The ID taken from the URL path.
/// * `req` - The incoming request, used to derive the base URL.
async fn get_template(
    state: &AppState,
    template_id: String,
    req: &HttpRequest,
) -> Result<TemplateResponse, ApiError> {
    let store = state.templates.clone();
    let template = blocking("Failed to fetch template", move || store.get_by_id(&template_id))
        .await?
        .ok_or(ApiError::NotFound("Template not found"))?;
    Ok(TemplateResponse::new(&template, &state.base_url(req)))
}
