//! # HTTP Services
//!
//! One sub-module per API area. Each exposes `configure_routes()` returning
//! the Actix `Scope` mounted by `main.rs`, and one file per operation whose
//! `process` function is the Actix handler.
//!
//! Handlers share [`ApiError`] for their failure replies: a status code and a
//! JSON body `{"error": "..."}`. Internal details are logged, not returned.

pub mod files;
pub mod forms;
pub mod health;
pub mod legacy;
pub mod pdf;
pub mod templates;

use crate::error::RenderError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use log::error;
use serde_json::json;

/// Registers every API scope on an application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(templates::configure_routes())
        .service(forms::configure_routes())
        .service(files::configure_routes())
        .service(files::configure_upload_routes())
        .service(files::configure_legacy_routes())
        .service(legacy::configure_routes())
        .service(pdf::configure_routes())
        .service(health::configure_routes());
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(String),
    /// Logged with its cause; the caller only sees the message.
    Internal {
        message: &'static str,
        cause: String,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, cause: impl ToString) -> Self {
        ApiError::Internal {
            message,
            cause: cause.to_string(),
        }
    }

    /// Maps a store failure, turning `NotFound` into a 404 with `not_found`.
    pub fn from_store(err: StoreError, not_found: &'static str, message: &'static str) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(not_found),
            other => ApiError::internal(message, other),
        }
    }

    /// Maps a render failure to the generic HTML/PDF fault.
    pub fn from_render(err: RenderError) -> Self {
        match err {
            RenderError::NotFound(_) => ApiError::NotFound("Template not found"),
            other => ApiError::internal(other.fault_message(), other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(message) => message.to_string(),
            ApiError::BadRequest(message) => message,
            ApiError::Internal { message, cause } => {
                error!("{}: {}", message, cause);
                message.to_string()
            }
        };
        HttpResponse::build(status).json(json!({ "error": message }))
    }
}

/// Runs a blocking store call on the blocking thread pool.
pub async fn blocking<F, T>(message: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(message, e))?
        .map_err(|e| ApiError::from_store(e, "Not found", message))
}
