//! End-to-end checks of the HTTP API against an on-disk database, a local
//! asset store and a rasterizer that records the HTML it is given.

use actix_web::dev::ServiceResponse;
use actix_web::http::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use backend::config::Config;
use backend::error::RenderError;
use backend::render::rasterize::Rasterizer;
use backend::services;
use backend::state::AppState;
use backend::store::assets::LocalAssetStore;
use backend::store::Database;
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const FAKE_PDF: &[u8] = b"%PDF-1.7 fake";

#[derive(Default)]
struct RecordingRasterizer {
    documents: Mutex<Vec<String>>,
}

impl RecordingRasterizer {
    fn last(&self) -> String {
        self.documents.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl Rasterizer for RecordingRasterizer {
    fn rasterize<'a>(&'a self, html: &'a str) -> BoxFuture<'a, Result<Vec<u8>, RenderError>> {
        self.documents.lock().unwrap().push(html.to_string());
        async { Ok::<_, RenderError>(FAKE_PDF.to_vec()) }.boxed()
    }
}

struct Harness {
    state: AppState,
    rasterizer: Arc<RecordingRasterizer>,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: dir.path().join("api.sqlite"),
        asset_dir: dir.path().join("assets"),
        static_dir: dir.path().join("static"),
        base_url: Some("http://files.test".to_string()),
        ..Config::default()
    };
    let db = Database::open(&config.database_path).unwrap();
    let assets = Arc::new(LocalAssetStore::new(&config.asset_dir));
    let rasterizer = Arc::new(RecordingRasterizer::default());
    let state = AppState::new(config, db, assets, rasterizer.clone());
    Harness {
        state,
        rasterizer,
        _dir: dir,
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(services::configure),
        )
        .await
    };
}

fn lease_template() -> Value {
    json!({
        "displayName": "Lease",
        "description": "Residential lease",
        "fields": [{
            "name": "Tenant",
            "type": "text",
            "dataKey": "tenant",
            "position": { "top": 100.0, "left": 50.0, "width": 200.0, "height": 24.0 }
        }]
    })
}

fn header<B>(resp: &ServiceResponse<B>, name: HeaderName) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn template_lifecycle() {
    let h = harness();
    let app = app!(h.state);

    let req = test::TestRequest::post()
        .uri("/api/templates")
        .set_json(lease_template())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["dataInterface"], "LeaseFormData");
    assert_eq!(created["fields"][0]["dataKey"], "tenant");

    let req = test::TestRequest::get().uri(&format!("/api/templates/{}", id)).to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["displayName"], "Lease");

    let req = test::TestRequest::put()
        .uri(&format!("/api/templates/{}", id))
        .set_json(json!({ "displayName": "", "description": "Updated", "fields": [] }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["displayName"], "Lease");
    assert_eq!(updated["description"], "Updated");
    assert_eq!(updated["fields"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::put()
        .uri("/api/templates/fixed-id")
        .set_json(json!({ "displayName": "Deed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/templates").to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let req = test::TestRequest::delete().uri(&format!("/api/templates/{}", id)).to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::get().uri(&format!("/api/templates/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Template not found");
}

#[actix_web::test]
async fn generate_pdf_renders_values_and_names_attachment() {
    let h = harness();
    let app = app!(h.state);

    let req = test::TestRequest::put()
        .uri("/api/templates/T1")
        .set_json(lease_template())
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/generate-pdf")
        .set_json(json!({ "templateId": "T1", "data": { "tenant": "Bob <Jr>" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, CONTENT_TYPE), "application/pdf");
    assert_eq!(header(&resp, CONTENT_DISPOSITION), "attachment; filename=T1.pdf");
    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));

    let html = h.rasterizer.last();
    assert!(html.contains("Bob &lt;Jr&gt;"));
    assert!(html.contains("top:100px;left:50px;width:200px;height:24px;"));
}

#[actix_web::test]
async fn generate_pdf_for_unknown_template_is_not_found() {
    let h = harness();
    let app = app!(h.state);

    let req = test::TestRequest::post()
        .uri("/api/generate-pdf")
        .set_json(json!({ "templateId": "missing", "data": {} }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(h.rasterizer.documents.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn submission_pdf_uses_stored_values() {
    let h = harness();
    let app = app!(h.state);

    let req = test::TestRequest::put()
        .uri("/api/templates/T1")
        .set_json(lease_template())
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/forms/submit")
        .set_json(json!({ "templateId": "T1", "formData": { "tenant": "Alice" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let submitted: Value = test::read_body_json(resp).await;
    assert_eq!(submitted["status"], "draft");
    let id = submitted["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/api/templates/T1/forms").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/forms/{}/generate-pdf", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        header(&resp, CONTENT_DISPOSITION),
        format!("attachment; filename=Lease_{}.pdf", &id[..8])
    );
    assert!(h.rasterizer.last().contains("Alice"));
}

#[actix_web::test]
async fn uploaded_background_is_served_and_rendered() {
    let h = harness();
    let app = app!(h.state);

    let req = test::TestRequest::put()
        .uri("/api/templates/T1")
        .set_json(lease_template())
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="794" height="1123"></svg>"#;
    let boundary = "fastfill-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"pageIndex\"\r\n\r\n\
         0\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"svg\"; filename=\"lease.svg\"\r\n\
         Content-Type: image/svg+xml\r\n\r\n\
         {svg}\r\n\
         --{b}--\r\n",
        b = boundary,
        svg = svg
    );
    let req = test::TestRequest::post()
        .uri("/api/upload/svg/T1")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let uploaded: Value = test::read_body_json(resp).await;
    assert_eq!(uploaded["originalName"], "lease.svg");
    assert_eq!(uploaded["url"], "http://files.test/api/files/svg/T1");

    let req = test::TestRequest::get().uri("/api/files/svg/T1/page/0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, CONTENT_TYPE), "image/svg+xml");
    assert_eq!(test::read_body(resp).await, svg.as_bytes());

    let req = test::TestRequest::get().uri("/api/templates/T1").to_request();
    let template: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(template["svgBackground"], "/api/files/svg/T1");
    assert_eq!(
        template["svgFiles"][0]["fileUrl"],
        "http://files.test/api/files/svg/T1/page/0"
    );

    let req = test::TestRequest::post()
        .uri("/api/generate-pdf")
        .set_json(json!({ "templateId": "T1", "data": { "tenant": "Bob" } }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(h.rasterizer.last().contains("data:image/svg+xml;base64,"));
}

#[actix_web::test]
async fn upload_rejects_non_svg() {
    let h = harness();
    let app = app!(h.state);

    let boundary = "fastfill-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"svg\"; filename=\"scan.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         not an svg\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let req = test::TestRequest::post()
        .uri("/api/upload/svg/T1")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn form_svg_catalog_creates_renderable_templates() {
    let h = harness();
    let app = app!(h.state);

    let category = h.state.config.static_dir.join("templates/form_svg/lease");
    std::fs::create_dir_all(&category).unwrap();
    std::fs::write(category.join("page1.svg"), "<svg/>").unwrap();

    let req = test::TestRequest::get().uri("/api/form-templates").to_request();
    let catalog: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(catalog["templates"][0]["name"], "lease");
    assert_eq!(catalog["templates"][0]["svgFiles"], json!(["page1.svg"]));
    assert_eq!(
        catalog["templates"][0]["previewUrl"],
        "http://files.test/static/templates/form_svg/lease/page1.svg"
    );

    let req = test::TestRequest::post()
        .uri("/api/templates/from-form-svg")
        .set_json(json!({
            "displayName": "Lease",
            "formCategory": "lease",
            "svgFileName": "page1.svg"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["message"], "Template created successfully");
    assert_eq!(
        created["template"]["svgBackground"],
        "/static/templates/form_svg/lease/page1.svg"
    );
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/generate-pdf")
        .set_json(json!({ "templateId": id, "data": {} }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(h.rasterizer.last().contains("data:image/svg+xml;base64,PHN2Zy8+"));
}

#[actix_web::test]
async fn form_svg_catalog_rejects_unknown_or_escaping_files() {
    let h = harness();
    let app = app!(h.state);

    let req = test::TestRequest::get().uri("/api/form-templates").to_request();
    let catalog: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(catalog["templates"], json!([]));

    for (category, file) in [("lease", "missing.svg"), ("..", "api.sqlite")] {
        let req = test::TestRequest::post()
            .uri("/api/templates/from-form-svg")
            .set_json(json!({
                "displayName": "Lease",
                "formCategory": category,
                "svgFileName": file
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    let req = test::TestRequest::get().uri("/api/templates").to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn health_reports_ok() {
    let h = harness();
    let app = app!(h.state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}
