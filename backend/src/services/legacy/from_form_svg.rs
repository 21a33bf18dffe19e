//! # Template From Form SVG Service
//!
//! Handles `POST /api/templates/from-form-svg`. The new template starts with
//! no fields and references its catalog file as
//! `/static/templates/form_svg/{formCategory}/{svgFileName}`, which the
//! Background Resolver reads from the static directory when rendering.

use super::{catalog_dir, catalog_url, is_plain_name};
use crate::services::templates::save_template;
use crate::services::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::model::template::Template;
use common::requests::{CreateFromFormSvgRequest, CreateTemplateRequest};
use common::responses::{CreatedTemplateResponse, TemplateResponse};
use log::info;
use uuid::Uuid;

/// Actix web handler for `POST /api/templates/from-form-svg`.
///
/// # Returns
/// - `201 Created` with `{id, message, template}`.
/// - `400 Bad Request` for blank or path-like names, or a catalog file that does not exist.
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<CreateFromFormSvgRequest>,
    req: HttpRequest,
) -> impl Responder {
    match create(&state, payload.into_inner()).await {
        Ok(template) => HttpResponse::Created().json(CreatedTemplateResponse {
            id: template.id.clone(),
            message: "Template created successfully".to_string(),
            template: TemplateResponse::new(&template, &state.base_url(&req)),
        }),
        Err(e) => e.into_response(),
    }
}

async fn create(state: &AppState, request: CreateFromFormSvgRequest) -> Result<Template, ApiError> {
    let request = validate(request)?;
    let path = catalog_dir(&state.config)
        .join(&request.form_category)
        .join(&request.svg_file_name);
    if !tokio::fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false) {
        return Err(ApiError::BadRequest("Selected SVG file does not exist".to_string()));
    }

    let svg_background = catalog_url(&request.form_category, &request.svg_file_name);
    let template = save_template(
        state,
        Uuid::new_v4().to_string(),
        CreateTemplateRequest {
            display_name: request.display_name,
            description: request.description,
            category: request.category,
            preview_image: String::new(),
            svg_background,
            data_interface: String::new(),
            fields: Vec::new(),
        },
        false,
    )
    .await?;
    info!("Template {} created from form SVG {}", template.id, template.svg_background);
    Ok(template)
}

fn validate(mut request: CreateFromFormSvgRequest) -> Result<CreateFromFormSvgRequest, ApiError> {
    request.display_name = request.display_name.trim().to_string();
    request.form_category = request.form_category.trim().to_string();
    request.svg_file_name = request.svg_file_name.trim().to_string();
    let valid = !request.display_name.is_empty()
        && is_plain_name(&request.form_category)
        && is_plain_name(&request.svg_file_name);
    if valid {
        Ok(request)
    } else {
        Err(ApiError::BadRequest("Invalid request data".to_string()))
    }
}
