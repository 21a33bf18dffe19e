//! Effective field styles for one render.
//!
//! A stored [`Field`] carries optional formatting attributes; a render request
//! may carry an override bag per data key. [`resolve`] merges the two over the
//! renderer defaults without touching the stored field.

use common::model::formatting::FieldFormatting;
use common::model::template::{Field, Position};
use std::collections::HashMap;

pub const DEFAULT_FONT_SIZE_PT: u32 = 12;
pub const DEFAULT_FONT_WEIGHT: &str = "normal";
pub const DEFAULT_FONT_STYLE: &str = "normal";
pub const DEFAULT_TEXT_DECORATION: &str = "none";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_FONT_FAMILY: &str = "Times New Roman";

/// A field after formatting overrides have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveField {
    pub data_key: String,
    pub position: Position,
    pub font_size: u32,
    pub font_weight: String,
    pub font_style: String,
    pub text_decoration: String,
    pub text_color: String,
    pub font_family: String,
}

/// Merges `field` with the override bag stored under its data key.
///
/// Non-empty override attributes win, then the field's own non-empty
/// attributes, then the defaults. Missing bags change nothing.
pub fn resolve(field: &Field, overrides: &HashMap<String, FieldFormatting>) -> EffectiveField {
    let bag = overrides.get(&field.data_key);

    EffectiveField {
        data_key: field.data_key.clone(),
        position: field.position,
        font_size: field
            .font_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_FONT_SIZE_PT),
        font_weight: pick(
            bag.and_then(|b| b.font_weight.as_deref()),
            field.font_weight.as_deref(),
            DEFAULT_FONT_WEIGHT,
        ),
        font_style: pick(
            bag.and_then(|b| b.font_style.as_deref()),
            field.font_style.as_deref(),
            DEFAULT_FONT_STYLE,
        ),
        text_decoration: pick(
            bag.and_then(|b| b.text_decoration.as_deref()),
            field.text_decoration.as_deref(),
            DEFAULT_TEXT_DECORATION,
        ),
        text_color: pick(
            bag.and_then(|b| b.text_color.as_deref()),
            field.text_color.as_deref(),
            DEFAULT_TEXT_COLOR,
        ),
        font_family: pick(
            bag.and_then(|b| b.font_family.as_deref()),
            field.font_family.as_deref(),
            DEFAULT_FONT_FAMILY,
        ),
    }
}

fn pick(over: Option<&str>, stored: Option<&str>, default: &str) -> String {
    non_empty(over)
        .or_else(|| non_empty(stored))
        .unwrap_or(default)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
