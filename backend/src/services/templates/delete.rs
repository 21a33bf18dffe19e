//! # Template Deletion Service
//!
//! `DELETE /api/templates/{template_id}` removes the template row, its fields
//! and its page background records in one transaction, then drops the stored
//! background bytes. Losing the bytes is logged and does not fail the request.
//! Form submissions of the template are kept.

use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;

pub async fn process(state: web::Data<AppState>, template_id: web::Path<String>) -> impl Responder {
    match delete_template(&state, template_id.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Template deleted successfully" })),
        Err(e) => e.into_response(),
    }
}

async fn delete_template(state: &AppState, template_id: String) -> Result<(), ApiError> {
    let store = state.templates.clone();
    let id = template_id.clone();
    let removed = blocking("Failed to delete template", move || store.delete(&id)).await?;

    for background in &removed {
        if let Err(e) = state.assets.delete(&background.asset_ref).await {
            warn!(
                "Template {}: could not delete asset {}: {}",
                template_id, background.asset_ref, e
            );
        }
    }
    info!("Template {} deleted with {} background(s)", template_id, removed.len());
    Ok(())
}
