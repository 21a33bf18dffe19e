//! # Form SVG Catalog Service Module
//!
//! Endpoints kept for older clients that build templates from the bundled
//! catalog of blank forms under `{static_dir}/templates/form_svg/{category}/`.
//!
//! ## Sub-modules:
//! - `form_templates`: Lists the catalog categories and their SVG files.
//! - `from_form_svg`: Creates a template whose background is one catalog file.
//!   Its route lives in the templates scope.

pub mod form_templates;
pub mod from_form_svg;

use crate::config::Config;
use actix_web::web::{get, resource};
use actix_web::Resource;
use std::path::PathBuf;

/// Catalog location relative to the static directory, also its URL path below `/static`.
const CATALOG_PATH: &str = "templates/form_svg";

/// `GET /api/form-templates`
pub fn configure_routes() -> Resource {
    resource("/api/form-templates").route(get().to(form_templates::process))
}

fn catalog_dir(config: &Config) -> PathBuf {
    config.static_dir.join(CATALOG_PATH)
}

/// Host-relative URL of a catalog file.
fn catalog_url(category: &str, file_name: &str) -> String {
    format!("/static/{}/{}/{}", CATALOG_PATH, category, file_name)
}

/// A single path segment naming a visible file or directory.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn is_svg(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".svg")
}
