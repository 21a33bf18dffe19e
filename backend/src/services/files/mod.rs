//! # Background File Service Module
//!
//! Uploading, serving and deleting the SVG page backgrounds of templates.
//!
//! ## Sub-modules:
//! - `upload`: Multipart upload of one page background.
//! - `serve`: Serves background bytes for every stored reference shape.
//! - `delete`: Removes one background record and its bytes.

mod delete;
pub mod serve;
mod upload;

use actix_web::web::{delete, get, post, resource, scope};
use actix_web::Scope;

const FILES_PATH: &str = "/api/files";
const UPLOAD_PATH: &str = "/api/upload";
const LEGACY_PATH: &str = "/templates";

/// # Registered Routes:
///
/// *   **`GET /api/files/svg/{template_id}`**: `serve::latest`, the most recent background.
/// *   **`DELETE /api/files/svg/{svg_file_id}`**: `delete::process`, by background record ID.
/// *   **`GET /api/files/svg/{template_id}/page/{page_index}`**: `serve::page`.
pub fn configure_routes() -> Scope {
    scope(FILES_PATH)
        .service(
            resource("/svg/{id}")
                .route(get().to(serve::latest))
                .route(delete().to(delete::process)),
        )
        .route("/svg/{template_id}/page/{page_index}", get().to(serve::page))
}

/// **`POST /api/upload/svg/{template_id}`**: `upload::process`.
pub fn configure_upload_routes() -> Scope {
    scope(UPLOAD_PATH).route("/svg/{template_id}", post().to(upload::process))
}

/// **`GET /templates/{template_id}/{filename}`**: `serve::legacy`, old object-path URLs.
pub fn configure_legacy_routes() -> Scope {
    scope(LEGACY_PATH).route("/{template_id}/{filename}", get().to(serve::legacy))
}
