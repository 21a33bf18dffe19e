//! # Template Save Service
//!
//! Handles `POST /api/templates` (create) and `PUT /api/templates/{template_id}`
//! (update, or create under the given ID when absent).
//!
//! Updates keep stored metadata for every field the client leaves empty, and
//! always replace the whole field list. The saved template is read back so the
//! response carries store-assigned field IDs and the page backgrounds.

use crate::services::{blocking, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use common::model::template::Template;
use common::requests::CreateTemplateRequest;
use common::responses::TemplateResponse;
use log::info;
use uuid::Uuid;

/// Actix web handler for `POST /api/templates`.
///
/// # Returns
/// - `201 Created` with the stored template.
/// - `400 Bad Request` when `displayName` is blank.
pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<CreateTemplateRequest>,
    req: HttpRequest,
) -> impl Responder {
    let id = Uuid::new_v4().to_string();
    match save_template(&state, id, payload.into_inner(), false).await {
        Ok(template) => HttpResponse::Created().json(TemplateResponse::new(&template, &state.base_url(&req))),
        Err(e) => e.into_response(),
    }
}

/// Actix web handler for `PUT /api/templates/{template_id}`.
///
/// # Returns
/// - `200 OK` with the stored template, whether it was updated or created.
pub async fn update(
    state: web::Data<AppState>,
    template_id: web::Path<String>,
    payload: web::Json<CreateTemplateRequest>,
    req: HttpRequest,
) -> impl Responder {
    match save_template(&state, template_id.into_inner(), payload.into_inner(), true).await {
        Ok(template) => HttpResponse::Ok().json(TemplateResponse::new(&template, &state.base_url(&req))),
        Err(e) => e.into_response(),
    }
}

/// Converts the request into a [`Template`] and writes it.
///
/// # Arguments
/// * `id` - ID of the template to write.
/// * `request` - The editor payload.
/// * `upsert` - Update an existing template with this ID instead of failing on it.
///
/// # Returns
/// The template as stored, hydrated.
pub(crate) async fn save_template(
    state: &AppState,
    id: String,
    request: CreateTemplateRequest,
    upsert: bool,
) -> Result<Template, ApiError> {
    let exists = if upsert {
        let store = state.templates.clone();
        let lookup_id = id.clone();
        blocking("Database error", move || store.exists(&lookup_id)).await?
    } else {
        false
    };

    if !exists && request.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest("displayName is required".to_string()));
    }

    let template = build_template(id, request, !exists);
    let store = state.templates.clone();
    let message = if exists { "Failed to update template" } else { "Failed to create template" };
    let saved = blocking(message, move || {
        if exists {
            store.update(&template)?;
        } else {
            store.create(&template)?;
        }
        store.get_by_id(&template.id)
    })
    .await?
    .ok_or(ApiError::NotFound("Template not found"))?;

    info!(
        "Template {} {} with {} field(s)",
        saved.id,
        if exists { "updated" } else { "created" },
        saved.fields.len()
    );
    Ok(saved)
}

/// Builds the template row. New templates default `dataInterface` to
/// `{displayName}FormData`; updates leave empty values for the store to keep.
fn build_template(id: String, request: CreateTemplateRequest, is_new: bool) -> Template {
    let now = Utc::now();
    let data_interface = if is_new && request.data_interface.trim().is_empty() {
        format!("{}FormData", request.display_name)
    } else {
        request.data_interface
    };
    Template {
        id,
        display_name: request.display_name,
        description: request.description,
        category: request.category,
        preview_image: request.preview_image,
        svg_background: request.svg_background,
        data_interface,
        created_at: now,
        updated_at: now,
        fields: request.fields.into_iter().map(|f| f.into_field()).collect(),
        page_backgrounds: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> CreateTemplateRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn new_template_gets_default_data_interface() {
        let template = build_template(
            "T1".to_string(),
            request(json!({ "displayName": "Lease", "fields": [] })),
            true,
        );
        assert_eq!(template.data_interface, "LeaseFormData");
    }

    #[test]
    fn explicit_data_interface_and_updates_are_kept() {
        let explicit = build_template(
            "T1".to_string(),
            request(json!({ "displayName": "Lease", "dataInterface": "LeaseData" })),
            true,
        );
        assert_eq!(explicit.data_interface, "LeaseData");

        let update = build_template("T1".to_string(), request(json!({ "displayName": "" })), false);
        assert_eq!(update.data_interface, "");
    }
}
