//! # HTML Compositor
//!
//! Builds the HTML document handed to the rasterizer. Every page is a fixed
//! 794×1123 px canvas (A4 at 96 DPI) with each field drawn as an absolutely
//! positioned block over an optional cover-fit background image.
//!
//! Values are looked up per field, not per key, so two fields sharing a data
//! key both show the value. HTML-flavored values are inserted as markup; plain
//! values are escaped.

use crate::render::formatting::EffectiveField;
use serde_json::Value;
use std::collections::HashMap;

pub const PAGE_WIDTH_PX: u32 = 794;
pub const PAGE_HEIGHT_PX: u32 = 1123;

const PAGE_BREAK: &str = "<div class=\"page-break\"></div>";

/// A value ready to be placed into a field block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergedValue {
    /// Escaped on output.
    Text(String),
    /// Inserted verbatim.
    Markup(String),
}

/// Plain values overlaid with every non-empty HTML-flavored value.
pub fn merge_values(
    values: &HashMap<String, Value>,
    html_values: &HashMap<String, String>,
) -> HashMap<String, MergedValue> {
    let mut merged: HashMap<String, MergedValue> = values
        .iter()
        .map(|(key, value)| (key.clone(), MergedValue::Text(value_text(value))))
        .collect();

    for (key, markup) in html_values {
        if !markup.is_empty() {
            merged.insert(key.clone(), MergedValue::Markup(markup.clone()));
        }
    }
    merged
}

/// Display text of a submitted JSON value.
///
/// Strings render as their content, `null` as nothing, anything else as
/// compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Replaces the HTML special characters with their entities.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Renders one page canvas.
///
/// # Arguments
/// * `fields` - Effective fields of the page, in stored order.
/// * `values` - Output of [`merge_values`].
/// * `background` - A `data:` URI, or `None` for a blank page.
pub fn compose_page(
    fields: &[EffectiveField],
    values: &HashMap<String, MergedValue>,
    background: Option<&str>,
) -> String {
    let mut html = String::new();
    match background {
        Some(uri) => html.push_str(&format!(
            "<div class=\"page\" style=\"background-image:url('{}');\">",
            escape_html(uri)
        )),
        None => html.push_str("<div class=\"page\">"),
    }

    for field in fields {
        let content = match values.get(&field.data_key) {
            Some(MergedValue::Markup(markup)) => markup.clone(),
            Some(MergedValue::Text(text)) => escape_html(text),
            None => String::new(),
        };
        html.push_str(&format!(
            "<div class=\"field\" data-key=\"{}\" style=\"{}\">{}</div>",
            escape_html(&field.data_key),
            escape_html(&field_style(field)),
            content
        ));
    }

    html.push_str("</div>");
    html
}

/// Inline style of one field block.
pub fn field_style(field: &EffectiveField) -> String {
    let p = field.position;
    format!(
        "top:{}px;left:{}px;width:{}px;height:{}px;font-size:{}pt;font-weight:{};font-style:{};text-decoration:{};color:{};font-family:'{}';",
        p.top,
        p.left,
        p.width,
        p.height,
        field.font_size,
        field.font_weight,
        field.font_style,
        field.text_decoration,
        field.text_color,
        field.font_family
    )
}

/// Wraps page fragments into a printable document, forcing a page break
/// between consecutive pages.
pub fn compose_document(pages: &[String]) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{}</style>\n</head>\n<body>{}</body>\n</html>\n",
        stylesheet(),
        pages.join(PAGE_BREAK)
    )
}

fn stylesheet() -> String {
    format!(
        "@page{{size:8.27in 11.69in;margin:0}}\
         *{{margin:0;padding:0;box-sizing:border-box}}\
         html,body{{-webkit-print-color-adjust:exact;print-color-adjust:exact}}\
         .page{{position:relative;width:{w}px;height:{h}px;overflow:hidden;\
         background-size:cover;background-position:center;background-repeat:no-repeat}}\
         .field{{position:absolute;overflow:hidden;line-height:1.2;white-space:pre-wrap;word-wrap:break-word}}\
         .page-break{{page-break-after:always;break-after:page}}",
        w = PAGE_WIDTH_PX,
        h = PAGE_HEIGHT_PX
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::formatting::resolve;
    use common::model::template::{Field, Position};
    use serde_json::json;

    fn effective(key: &str, position: Position) -> EffectiveField {
        let field = Field {
            name: key.to_string(),
            field_type: "text".to_string(),
            data_key: key.to_string(),
            position,
            ..Field::default()
        };
        resolve(&field, &HashMap::new())
    }

    fn values(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn html_values_take_precedence() {
        let merged = merge_values(
            &values(&[("name", json!("Alice")), ("city", json!("Paris"))]),
            &HashMap::from([
                ("name".to_string(), "<b>Alice</b>".to_string()),
                ("city".to_string(), String::new()),
            ]),
        );
        assert_eq!(merged["name"], MergedValue::Markup("<b>Alice</b>".to_string()));
        assert_eq!(merged["city"], MergedValue::Text("Paris".to_string()));

        let page = compose_page(&[effective("name", Position::default())], &merged, None);
        assert!(page.contains("<b>Alice</b>"));
        assert!(!page.contains("&lt;b&gt;"));
    }

    #[test]
    fn plain_text_is_escaped() {
        let merged = merge_values(&values(&[("name", json!("<b>Tom & Jerry</b>"))]), &HashMap::new());
        let page = compose_page(&[effective("name", Position::default())], &merged, None);
        assert!(page.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
    }

    #[test]
    fn positions_field_block() {
        let merged = merge_values(&values(&[("name", json!("Bob"))]), &HashMap::new());
        let position = Position { top: 10, left: 10, width: 100, height: 20 };
        let page = compose_page(&[effective("name", position)], &merged, None);

        assert!(page.contains("top:10px;left:10px;width:100px;height:20px;"));
        assert!(page.contains("font-size:12pt;font-weight:normal;font-style:normal;"));
        assert!(page.contains(">Bob</div>"));
    }

    #[test]
    fn duplicate_keys_render_twice_and_missing_values_are_empty() {
        let merged = merge_values(&values(&[("name", json!("Bob"))]), &HashMap::new());
        let fields = vec![
            effective("name", Position::default()),
            effective("name", Position { top: 50, ..Position::default() }),
            effective("email", Position::default()),
        ];
        let page = compose_page(&fields, &merged, None);
        assert_eq!(page.matches(">Bob</div>").count(), 2);
        assert!(page.contains("data-key=\"email\" style="));
        assert!(page.contains("\"></div></div>"));
    }

    #[test]
    fn background_is_optional() {
        let with = compose_page(&[], &HashMap::new(), Some("data:image/svg+xml;base64,AAA="));
        assert!(with.starts_with("<div class=\"page\" style=\"background-image:url('data:image/svg+xml;base64,AAA=');\">"));

        let without = compose_page(&[], &HashMap::new(), None);
        assert_eq!(without, "<div class=\"page\"></div>");
    }

    #[test]
    fn page_breaks_only_between_pages() {
        let single = compose_document(&["<div class=\"page\"></div>".to_string()]);
        assert!(!single.contains(PAGE_BREAK));

        let pages = vec!["<div class=\"page\">1</div>".to_string(); 3];
        let document = compose_document(&pages);
        assert_eq!(document.matches(PAGE_BREAK).count(), 2);
        assert!(document.contains("</div><div class=\"page-break\"></div><div class=\"page\">"));
        assert!(document.contains("width:794px;height:1123px"));
    }

    #[test]
    fn document_carries_print_geometry() {
        let document = compose_document(&["<div class=\"page\"></div>".to_string()]);
        assert!(document.contains("@page{size:8.27in 11.69in;margin:0}"));
        assert!(document.contains("-webkit-print-color-adjust:exact;print-color-adjust:exact"));
    }

    #[test]
    fn renders_json_values_as_text() {
        assert_eq!(value_text(&json!("x")), "x");
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!(42)), "42");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!(["a", 1])), "[\"a\",1]");
    }
}
