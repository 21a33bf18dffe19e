//! # Background Upload Service
//!
//! Backend logic for `POST /api/upload/svg/{template_id}`.
//!
//! ## Workflow
//!
//! 1.  **Multipart Parsing**: The `svg` part carries the file; its content type must
//!     be `image/svg+xml` (guessed from the filename when the client sends none). An
//!     optional `pageIndex` part selects the page; missing or unparsable means page 0.
//!
//! 2.  **Storage**: The bytes go to the asset store under
//!     `templates/{templateId}/{unixSeconds}_page{n}.svg`.
//!
//! 3.  **Replacement**: In one transaction the page's previous record is removed and
//!     the new one inserted. There is one background per page, last write wins. For
//!     page 0 the template's single background reference is pointed at
//!     `/api/files/svg/{templateId}`, so clients that only know one background per
//!     template keep working.
//!
//! 4.  **Cleanup**: The bytes no record points at any more are deleted: the replaced
//!     object on success, the fresh upload when the transaction fails.

use crate::render::background::{BackgroundRef, SVG_MIME};
use crate::services::{blocking, ApiError};
use crate::state::AppState;
use crate::store::assets::object_name;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use common::model::template::PageBackground;
use common::responses::UploadResponse;
use futures_util::StreamExt;
use log::{info, warn};

/// The uploaded file as read from the multipart body.
struct UploadedSvg {
    original_name: String,
    bytes: Vec<u8>,
    page_index: u32,
}

/// HTTP handler wrapper that converts the internal result to an `HttpResponse`.
///
/// - On success: `200 OK` with an `UploadResponse`.
/// - `400 Bad Request` when no SVG file is sent, `404 Not Found` for an unknown template.
pub async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<String>,
    payload: Multipart,
    req: HttpRequest,
) -> impl Responder {
    let template_id = template_id.into_inner();
    let upload = match read_upload(payload).await {
        Ok(upload) => upload,
        Err(e) => return e.into_response(),
    };
    match store_upload(&state, &template_id, upload).await {
        Ok(background) => {
            let url = format!(
                "{}{}",
                state.base_url(&req),
                BackgroundRef::CurrentLegacySingle { template_id }
            );
            HttpResponse::Ok().json(UploadResponse {
                message: "File uploaded successfully".to_string(),
                filename: background.filename,
                original_name: background.original_name,
                size: background.file_size,
                page_index: background.page_index,
                url,
                gcs_path: background.asset_ref,
            })
        }
        Err(e) => e.into_response(),
    }
}

/// Collects the `svg` and `pageIndex` parts.
async fn read_upload(mut payload: Multipart) -> Result<UploadedSvg, ApiError> {
    let mut svg: Option<(String, Vec<u8>)> = None;
    let mut page_index = 0u32;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("svg") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&filename)
                            .first_or_octet_stream()
                            .essence_str()
                            .to_string()
                    });
                if content_type != SVG_MIME {
                    return Err(ApiError::BadRequest("File must be an SVG".to_string()));
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| ApiError::BadRequest(format!("Upload interrupted: {}", e)))?;
                    bytes.extend_from_slice(&chunk);
                }
                svg = Some((filename, bytes));
            }
            Some("pageIndex") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| ApiError::BadRequest(format!("Upload interrupted: {}", e)))?;
                    bytes.extend_from_slice(&chunk);
                }
                page_index = parse_page_index(&bytes);
            }
            _ => {}
        }
    }

    let (original_name, bytes) = svg.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    Ok(UploadedSvg {
        original_name,
        bytes,
        page_index,
    })
}

fn parse_page_index(raw: &[u8]) -> u32 {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

/// Replaces the page's background with the uploaded file.
///
/// The bytes are stored first under a fresh object name; the record swap then
/// happens in one transaction. If the swap fails the new object is deleted
/// again, if it succeeds the replaced object is.
async fn store_upload(
    state: &AppState,
    template_id: &str,
    upload: UploadedSvg,
) -> Result<PageBackground, ApiError> {
    let store = state.templates.clone();
    let id = template_id.to_string();
    if !blocking("Failed to upload file", move || store.exists(&id)).await? {
        return Err(ApiError::NotFound("Template not found"));
    }

    let asset_ref = object_name(template_id, upload.page_index, &upload.original_name);
    let size = state
        .assets
        .put(&asset_ref, upload.bytes, SVG_MIME)
        .await
        .map_err(|e| ApiError::internal("Failed to upload file", e))?;

    let filename = asset_ref.rsplit('/').next().unwrap_or(&asset_ref).to_string();
    let record = PageBackground {
        id: 0,
        template_id: template_id.to_string(),
        page_index: upload.page_index,
        filename,
        original_name: upload.original_name,
        asset_ref: asset_ref.clone(),
        file_size: size as i64,
        mime_type: SVG_MIME.to_string(),
        created_at: Utc::now(),
    };
    let legacy_reference = BackgroundRef::CurrentLegacySingle {
        template_id: template_id.to_string(),
    }
    .to_string();

    let store = state.templates.clone();
    let swapped = blocking("Failed to upload file", move || {
        store.replace_page_background(&record, &legacy_reference)
    })
    .await;
    let outcome = match swapped {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Err(cleanup) = state.assets.delete(&asset_ref).await {
                warn!("Could not delete unreferenced asset {}: {}", asset_ref, cleanup);
            }
            return Err(e);
        }
    };

    if let Some(previous) = outcome.replaced {
        if let Err(e) = state.assets.delete(&previous.asset_ref).await {
            warn!("Could not delete replaced asset {}: {}", previous.asset_ref, e);
        }
    }

    let stored = outcome.stored;
    info!(
        "Stored background {} for page {} of template {} ({} bytes)",
        stored.asset_ref, stored.page_index, stored.template_id, stored.file_size
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::rasterize::ChromeRasterizer;
    use crate::store::assets::LocalAssetStore;
    use crate::store::Database;
    use chrono::Utc;
    use common::model::template::Template;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    fn state(root: &Path) -> AppState {
        let config = Config {
            database_path: root.join("upload.sqlite"),
            asset_dir: root.join("assets"),
            ..Config::default()
        };
        let db = Database::open(&config.database_path).unwrap();
        let assets = Arc::new(LocalAssetStore::new(&config.asset_dir));
        let rasterizer = Arc::new(ChromeRasterizer::new("chromium", Duration::from_secs(1)));
        let state = AppState::new(config, db, assets, rasterizer);

        let now = Utc::now();
        state
            .templates
            .create(&Template {
                id: "T1".to_string(),
                display_name: "Lease".to_string(),
                description: String::new(),
                category: String::new(),
                preview_image: String::new(),
                svg_background: String::new(),
                data_interface: String::new(),
                created_at: now,
                updated_at: now,
                fields: Vec::new(),
                page_backgrounds: Vec::new(),
            })
            .unwrap();
        state
    }

    fn svg(page_index: u32) -> UploadedSvg {
        UploadedSvg {
            original_name: "lease.svg".to_string(),
            bytes: b"<svg/>".to_vec(),
            page_index,
        }
    }

    fn stored_objects(root: &Path) -> Vec<String> {
        let dir = root.join("assets/templates/T1");
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn reupload_replaces_record_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let previous = PageBackground {
            id: 0,
            template_id: "T1".to_string(),
            page_index: 0,
            filename: "old.svg".to_string(),
            original_name: "old.svg".to_string(),
            asset_ref: "templates/T1/old.svg".to_string(),
            file_size: 6,
            mime_type: SVG_MIME.to_string(),
            created_at: Utc::now(),
        };
        state
            .assets
            .put(&previous.asset_ref, b"<svg/>".to_vec(), SVG_MIME)
            .await
            .unwrap();
        state.templates.insert_page_background(&previous).unwrap();

        let stored = store_upload(&state, "T1", svg(0)).await.unwrap();

        let backgrounds = state.templates.page_backgrounds("T1").unwrap();
        assert_eq!(backgrounds, vec![stored.clone()]);
        assert_eq!(stored_objects(dir.path()), vec![stored.filename]);
        assert_eq!(
            state.templates.get_by_id("T1").unwrap().unwrap().svg_background,
            "/api/files/svg/T1"
        );
    }

    #[tokio::test]
    async fn failed_record_write_removes_uploaded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        Database::open(dir.path().join("upload.sqlite"))
            .unwrap()
            .connect()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_svg BEFORE INSERT ON svg_files
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = store_upload(&state, "T1", svg(1)).await;
        assert!(matches!(result, Err(ApiError::Internal { .. })));
        assert!(stored_objects(dir.path()).is_empty());
        assert!(state.templates.page_backgrounds("T1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_to_unknown_template_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let result = store_upload(&state, "T9", svg(0)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert!(!dir.path().join("assets/templates/T9").exists());
    }

    #[test]
    fn page_index_defaults_to_zero() {
        assert_eq!(parse_page_index(b"2"), 2);
        assert_eq!(parse_page_index(b" 3 \r\n"), 3);
        assert_eq!(parse_page_index(b"two"), 0);
        assert_eq!(parse_page_index(b"-1"), 0);
        assert_eq!(parse_page_index(b""), 0);
    }
}
