use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Per-field style overrides supplied at render time, keyed by data key.
///
/// Every attribute is optional. An empty string counts as absent, so a client
/// that sends `"fontWeight": ""` keeps the field's stored weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFormatting {
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
}

impl FieldFormatting {
    /// Reads a formatting bag out of loosely typed JSON.
    ///
    /// Anything that is not an object yields an empty bag, and attributes that
    /// are not strings are dropped instead of failing the whole request.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            font_weight: text("fontWeight"),
            font_style: text("fontStyle"),
            text_decoration: text("textDecoration"),
            text_color: text("textColor"),
            font_family: text("fontFamily"),
        }
    }

    /// Converts a whole `dataKey -> bag` JSON map, see [`FieldFormatting::from_value`].
    pub fn map_from_json(map: &HashMap<String, Value>) -> HashMap<String, FieldFormatting> {
        map.iter()
            .map(|(key, value)| (key.clone(), Self::from_value(value)))
            .collect()
    }
}
