//! # Form Submission Service Module
//!
//! Routes under `/api/forms`: submitting, reading, updating and deleting
//! filled-in forms, and rendering a stored submission to PDF.
//!
//! ## Sub-modules:
//! - `submit`: Stores a new submission (status `draft` unless given).
//! - `get`: Reads one submission, or all submissions of a template.
//! - `update`: Replaces values, maps and status of a submission.
//! - `delete`: Removes a submission.

mod delete;
pub mod get;
mod submit;
mod update;

use crate::services::pdf;
use actix_web::web::{delete, get, post, put, resource, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/forms";

/// # Registered Routes:
///
/// *   **`POST /submit`**: `submit::process`
/// *   **`GET|PUT|DELETE /{submission_id}`**: `get::process`, `update::process`, `delete::process`
/// *   **`POST /{submission_id}/generate-pdf`**: `pdf::submission::process`, answering with
///     `Content-Disposition: attachment; filename={displayName}_{first 8 chars of id}.pdf`
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/submit", post().to(submit::process))
        .service(
            resource("/{submission_id}")
                .route(get().to(get::process))
                .route(put().to(update::process))
                .route(delete().to(delete::process)),
        )
        .route("/{submission_id}/generate-pdf", post().to(pdf::submission::process))
}
