//! # Template Service Module
//!
//! This module aggregates all API endpoints related to the management of templates.
//! It acts as a router, directing incoming HTTP requests under the `/api/templates`
//! path to the appropriate handler logic defined in its sub-modules.
//!
//! ## Sub-modules:
//! - `get`: Lists templates and retrieves a single hydrated template.
//! - `save`: Creates templates and updates (or creates) them by ID.
//! - `delete`: Removes a template with its fields, page backgrounds and stored bytes.

mod delete;
mod get;
mod save;

pub(crate) use save::save_template;

use crate::services::{files, forms, legacy};
use actix_web::web::{delete, get, post, put, resource, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /`** and **`POST /`**:
///     - **Handlers**: `get::list`, `save::create`
///     - **Description**: Lists every template, newest first, or creates a new one
///       from a `CreateTemplateRequest`. New templates get a fresh UUID and, when no
///       `dataInterface` is given, `{displayName}FormData`.
///
/// *   **`POST /from-form-svg`**:
///     - **Handler**: `legacy::from_form_svg::process`
///     - **Description**: Creates a template whose background is a file of the
///       bundled form SVG catalog. Registered ahead of `/{template_id}` so the
///       literal segment wins.
///
/// *   **`GET|PUT|DELETE /{template_id}`**:
///     - **Handlers**: `get::process`, `save::update`, `delete::process`
///     - **Description**: Reads, replaces or deletes one template. `PUT` creates the
///       template under the given ID when it does not exist yet.
///
/// *   **`GET /{template_id}/svg`**:
///     - **Handler**: `files::serve::svg_url`
///     - **Description**: Returns the current-format background URL of the template.
///
/// *   **`GET /{template_id}/forms`**:
///     - **Handler**: `forms::get::by_template`
///     - **Description**: Lists the form submissions stored against the template.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .service(
            resource("")
                .route(get().to(get::list))
                .route(post().to(save::create)),
        )
        .route("/from-form-svg", post().to(legacy::from_form_svg::process))
        .service(
            resource("/{template_id}")
                .route(get().to(get::process))
                .route(put().to(save::update))
                .route(delete().to(delete::process)),
        )
        .route("/{template_id}/svg", get().to(files::serve::svg_url))
        .route("/{template_id}/forms", get().to(forms::get::by_template))
}
