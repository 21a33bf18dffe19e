//! Inbound JSON payloads of the HTTP API.

use crate::model::template::{Field, Position};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body of `POST /api/templates` and `PUT /api/templates/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub preview_image: String,
    #[serde(default)]
    pub svg_background: String,
    #[serde(default)]
    pub data_interface: String,
    #[serde(default)]
    pub fields: Vec<FieldRequest>,
}

/// A field as sent by the template editor, or as an ad-hoc render-time field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRequest {
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
    pub options: Vec<String>,
    #[serde(default)]
    pub position: Option<PositionRequest>,
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub font_weight: Option<String>,
    #[serde(default)]
    pub font_style: Option<String>,
    #[serde(default)]
    pub text_decoration: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
}

/// Editor coordinates arrive as floats and are stored as whole pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PositionRequest {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl From<PositionRequest> for Position {
    fn from(p: PositionRequest) -> Self {
        Position {
            top: p.top as i64,
            left: p.left as i64,
            width: p.width as i64,
            height: p.height as i64,
        }
    }
}

impl FieldRequest {
    /// Builds the stored field. Options are trimmed and blank ones dropped.
    pub fn into_field(self) -> Field {
        let options = self
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        Field {
            id: 0,
            name: self.name,
            field_type: self.field_type,
            required: self.required,
            data_key: self.data_key,
            is_address_component: self.is_address_component,
            page_index: self.page_index,
            position: self.position.map(Position::from).unwrap_or_default(),
            font_size: self.font_size,
            font_weight: self.font_weight,
            font_style: self.font_style,
            text_decoration: self.text_decoration,
            text_color: self.text_color,
            font_family: self.font_family,
            options,
        }
    }
}

/// Body of `POST /api/forms/submit`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormRequest {
    pub template_id: String,
    pub form_data: Map<String, Value>,
    #[serde(default)]
    pub formatting_data: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub html_data: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub status: String,
}

/// Body of `PUT /api/forms/{id}`. Absent maps leave the stored ones untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormRequest {
    #[serde(default)]
    pub form_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub formatting_data: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub html_data: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub status: String,
}

/// Body of `POST /api/generate-pdf`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfRequest {
    pub template_id: String,
    pub data: HashMap<String, Value>,
    #[serde(default)]
    pub html_data: HashMap<String, Value>,
    #[serde(default)]
    pub formatting_data: HashMap<String, Value>,
    #[serde(default)]
    pub custom_fields: Vec<FieldRequest>,
}

/// Body of `POST /api/templates/from-form-svg`: a new template whose
/// background is one file of the bundled form SVG catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFromFormSvgRequest {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub form_category: String,
    pub svg_file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_request_trims_options_and_truncates_position() {
        let request: FieldRequest = serde_json::from_value(json!({
            "name": "Title",
            "type": "select",
            "dataKey": "title",
            "options": ["  Mr ", "", "   ", "Ms"],
            "position": { "top": 10.9, "left": 4.2, "width": 100.0, "height": 20.5 }
        }))
        .unwrap();

        let field = request.into_field();
        assert_eq!(field.options, vec!["Mr".to_string(), "Ms".to_string()]);
        assert_eq!(
            field.position,
            Position { top: 10, left: 4, width: 100, height: 20 }
        );
        assert_eq!(field.page_index, 0);
    }

    #[test]
    fn generate_request_optional_maps_default_to_empty() {
        let request: GeneratePdfRequest = serde_json::from_value(json!({
            "templateId": "T1",
            "data": { "name": "Bob" }
        }))
        .unwrap();
        assert!(request.html_data.is_empty());
        assert!(request.formatting_data.is_empty());
        assert!(request.custom_fields.is_empty());
    }
}
