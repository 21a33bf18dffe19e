//! # PDF Service Module
//!
//! Renders templates to PDF through the shared [`crate::render::Renderer`].
//!
//! ## Sub-modules:
//! - `generate`: `POST /api/generate-pdf`, values supplied in the request.
//! - `submission`: `POST /api/forms/{id}/generate-pdf`, values taken from a stored
//!   submission (mounted by the forms scope).
//!
//! Failures are reported with the generic "Failed to generate HTML" or
//! "Failed to generate PDF" message; the cause goes to the log.

mod generate;
pub mod submission;

use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::web::{post, resource};
use actix_web::{HttpResponse, Resource};

const API_PATH: &str = "/api/generate-pdf";

pub fn configure_routes() -> Resource {
    resource(API_PATH).route(post().to(generate::process))
}

/// `200 OK` with the PDF as an attachment named `filename`.
///
/// The filename goes into the header unquoted, as existing clients expect;
/// control characters are dropped so the header stays valid.
fn pdf_response(pdf: Vec<u8>, filename: &str) -> HttpResponse {
    let filename: String = filename.chars().filter(|c| !c.is_control()).collect();
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((CONTENT_DISPOSITION, format!("attachment; filename={}", filename)))
        .body(pdf)
}
