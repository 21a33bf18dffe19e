//! # Form Catalog Listing Service
//!
//! Handles `GET /api/form-templates`. Each visible subdirectory of the catalog
//! is a category; categories without any `.svg` file are left out. A missing
//! catalog directory is an empty catalog.

use super::{catalog_dir, catalog_url, is_plain_name, is_svg};
use crate::services::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::responses::{FormTemplateCatalog, FormTemplateEntry};
use std::io;
use std::path::Path;

/// Actix web handler for `GET /api/form-templates`.
///
/// # Returns
/// - `200 OK` with `{"templates": [...]}`, categories and files sorted by name.
/// - `500 Internal Server Error` when the catalog cannot be read.
pub async fn process(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let base_url = state.base_url(&req);
    match scan(&catalog_dir(&state.config), &base_url).await {
        Ok(templates) => HttpResponse::Ok().json(FormTemplateCatalog { templates }),
        Err(e) => ApiError::internal("Failed to read form templates", e).into_response(),
    }
}

async fn scan(root: &Path, base_url: &str) -> io::Result<Vec<FormTemplateEntry>> {
    let mut categories = match visible_entries(root, true).await {
        Ok(names) => names,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    categories.sort();

    let mut entries = Vec::new();
    for category in categories {
        let mut svg_files: Vec<String> = visible_entries(&root.join(&category), false)
            .await?
            .into_iter()
            .filter(|name| is_svg(name))
            .collect();
        if svg_files.is_empty() {
            continue;
        }
        svg_files.sort();
        entries.push(FormTemplateEntry {
            preview_url: format!("{}{}", base_url, catalog_url(&category, &svg_files[0])),
            display_name: category.clone(),
            name: category,
            svg_files,
        });
    }
    Ok(entries)
}

/// Names of the visible directories (`dirs`) or regular files in `dir`.
async fn visible_entries(dir: &Path, dirs: bool) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let file_type = entry.file_type().await?;
        let wanted = if dirs { file_type.is_dir() } else { file_type.is_file() };
        if !wanted {
            continue;
        }
        if let Some(name) = entry.file_name().to_str().filter(|n| is_plain_name(n)) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn lists_categories_with_svg_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("form_svg");
        fs::create_dir_all(root.join("lease")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("lease/page2.svg"), "<svg/>").unwrap();
        fs::write(root.join("lease/page1.SVG"), "<svg/>").unwrap();
        fs::write(root.join("lease/notes.txt"), "x").unwrap();
        fs::write(root.join("empty/readme.md"), "x").unwrap();
        fs::write(root.join(".hidden/a.svg"), "<svg/>").unwrap();

        let entries = scan(&root, "http://files.test").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "lease");
        assert_eq!(entries[0].svg_files, vec!["page1.SVG", "page2.svg"]);
        assert_eq!(
            entries[0].preview_url,
            "http://files.test/static/templates/form_svg/lease/page1.SVG"
        );
    }

    #[tokio::test]
    async fn missing_catalog_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(&dir.path().join("absent"), "").await.unwrap().is_empty());
    }
}
