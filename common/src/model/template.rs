use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reusable document layout: one or more background images with positioned
/// fields drawn over them.
///
/// A template with no `page_backgrounds` is a legacy single-page template and
/// renders over `svg_background`. As soon as one page background exists the
/// template is rendered page by page instead, and `svg_background` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub preview_image: String,
    /// Legacy single background reference (data URI, `/api/files/svg/...` or
    /// `templates/{id}/{file}`).
    #[serde(default)]
    pub svg_background: String,
    #[serde(default)]
    pub data_interface: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, rename = "svgFiles")]
    pub page_backgrounds: Vec<PageBackground>,
}

impl Template {
    /// True when the template renders through per-page backgrounds.
    pub fn is_multi_page(&self) -> bool {
        !self.page_backgrounds.is_empty()
    }
}

/// Absolute placement of a field on its page, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub top: i64,
    pub left: i64,
    pub width: i64,
    pub height: i64,
}

/// One positioned, typed slot on a template page.
///
/// `data_key` joins the field with a submitted value. Formatting attributes
/// left as `None` fall back to the renderer defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    pub data_key: String,
    #[serde(default)]
    pub is_address_component: bool,
    #[serde(default)]
    pub page_index: u32,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Background image asset of one page of a multi-page template.
///
/// `page_index` is unique per template; uploading a new background for a page
/// replaces the previous record and its stored bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBackground {
    pub id: i64,
    pub template_id: String,
    pub page_index: u32,
    pub filename: String,
    pub original_name: String,
    /// Opaque object name in the asset store.
    #[serde(rename = "gcsPath")]
    pub asset_ref: String,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}
