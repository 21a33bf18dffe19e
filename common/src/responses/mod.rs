//! Outbound JSON payloads of the HTTP API.

use crate::model::template::{Field, PageBackground, Template};
use serde::Serialize;

/// Template as returned to clients. Page backgrounds carry a `fileUrl` that
/// points back at the per-page file endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub preview_image: String,
    pub svg_background: String,
    pub data_interface: String,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub svg_files: Vec<SvgFileResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgFileResponse {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub page_index: u32,
    pub file_url: String,
}

impl TemplateResponse {
    /// `base_url` is the externally visible origin, without trailing slash.
    pub fn new(template: &Template, base_url: &str) -> Self {
        let svg_files = template
            .page_backgrounds
            .iter()
            .map(|bg| SvgFileResponse::new(bg, base_url))
            .collect();
        Self {
            id: template.id.clone(),
            display_name: template.display_name.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            preview_image: template.preview_image.clone(),
            svg_background: template.svg_background.clone(),
            data_interface: template.data_interface.clone(),
            fields: template.fields.clone(),
            svg_files,
        }
    }
}

impl SvgFileResponse {
    fn new(background: &PageBackground, base_url: &str) -> Self {
        Self {
            id: background.id,
            filename: background.filename.clone(),
            original_name: background.original_name.clone(),
            page_index: background.page_index,
            file_url: format!(
                "{}/api/files/svg/{}/page/{}",
                base_url, background.template_id, background.page_index
            ),
        }
    }
}

/// Reply of a successful SVG upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub original_name: String,
    pub size: i64,
    pub page_index: u32,
    pub url: String,
    pub gcs_path: String,
}

/// One category directory of the form SVG catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplateEntry {
    pub name: String,
    pub display_name: String,
    pub svg_files: Vec<String>,
    /// Absolute URL of the first SVG of the category.
    pub preview_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormTemplateCatalog {
    pub templates: Vec<FormTemplateEntry>,
}

/// Reply of `POST /api/templates/from-form-svg`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTemplateResponse {
    pub id: String,
    pub message: String,
    pub template: TemplateResponse,
}
