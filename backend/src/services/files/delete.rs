//! `DELETE /api/files/svg/{svg_file_id}` removes one background record and its
//! stored bytes. An unknown ID succeeds without doing anything.

use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;

pub async fn process(state: web::Data<AppState>, svg_file_id: web::Path<String>) -> impl Responder {
    let Ok(id) = svg_file_id.trim().parse::<i64>() else {
        return ApiError::BadRequest("Invalid SVG file ID".to_string()).into_response();
    };

    let store = state.templates.clone();
    let removed = match blocking("Failed to delete SVG file", move || store.delete_page_background(id)).await {
        Ok(removed) => removed,
        Err(e) => return e.into_response(),
    };

    if let Some(background) = removed {
        if let Err(e) = state.assets.delete(&background.asset_ref).await {
            warn!("Could not delete asset {}: {}", background.asset_ref, e);
        }
        info!(
            "Deleted background {} of template {}",
            background.id, background.template_id
        );
    }
    HttpResponse::Ok().json(json!({ "message": "SVG file deleted successfully" }))
}
