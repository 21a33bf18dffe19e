//! # Background Serving Service
//!
//! Serves stored SVG backgrounds through the same resolver the renderer uses,
//! so every URL shape a template may reference also works in a browser:
//!
//! - `GET /api/files/svg/{template_id}`: most recent background;
//! - `GET /api/files/svg/{template_id}/page/{page_index}`: one page;
//! - `GET /templates/{template_id}/{filename}`: legacy object path.
//!
//! Responses are `image/svg+xml` with `Cache-Control: public, max-age=3600`.

use crate::error::RenderError;
use crate::render::background::{BackgroundRef, SVG_MIME};
use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::http::header::CACHE_CONTROL;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn latest(state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let reference = BackgroundRef::CurrentLegacySingle {
        template_id: id.into_inner(),
    };
    serve(&state, reference).await
}

pub async fn page(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (template_id, page_index) = path.into_inner();
    match page_index.parse::<u32>() {
        Ok(page_index) => serve(&state, BackgroundRef::page(&template_id, page_index)).await,
        Err(_) => ApiError::BadRequest("Invalid page index".to_string()).into_response(),
    }
}

pub async fn legacy(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (template_id, filename) = path.into_inner();
    serve(&state, BackgroundRef::LegacyPath { template_id, filename }).await
}

/// `GET /api/templates/{template_id}/svg`: the current-format URL of the
/// template's background, or 404 when it has none.
pub async fn svg_url(state: web::Data<AppState>, template_id: web::Path<String>) -> impl Responder {
    let store = state.templates.clone();
    let id = template_id.into_inner();
    let lookup_id = id.clone();
    match blocking("Failed to fetch SVG file", move || store.page_backgrounds(&lookup_id)).await {
        Ok(backgrounds) if backgrounds.is_empty() => {
            ApiError::NotFound("SVG file not found").into_response()
        }
        Ok(_) => HttpResponse::Ok().json(json!({
            "url": BackgroundRef::CurrentLegacySingle { template_id: id }.to_string()
        })),
        Err(e) => e.into_response(),
    }
}

async fn serve(state: &AppState, reference: BackgroundRef) -> HttpResponse {
    match state.renderer.backgrounds().fetch_bytes(&reference).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(SVG_MIME)
            .insert_header((CACHE_CONTROL, "public, max-age=3600"))
            .body(bytes),
        Err(RenderError::AssetNotFound(_)) | Err(RenderError::NotFound(_)) => {
            ApiError::NotFound("SVG file not found").into_response()
        }
        Err(e) => ApiError::internal("Failed to get file", e).into_response(),
    }
}
