//! # Document Rendering Pipeline
//!
//! Turns a template and a bag of submitted values into HTML, then PDF.
//!
//! ## Workflow
//!
//! 1. Ad-hoc custom fields of the request are appended to the template's
//!    stored fields for this render only.
//! 2. Plain and HTML-flavored values are merged once for the whole document.
//! 3. Templates with page backgrounds are grouped into pages
//!    ([`pages::group_pages`]); templates without them render as a single
//!    legacy page over their legacy background reference.
//! 4. For every page the fields get their effective formatting
//!    ([`formatting::resolve`]) and the background is resolved into a
//!    `data:` URI ([`background::BackgroundResolver`]). A background that
//!    cannot be loaded is logged and the page renders blank.
//! 5. Page fragments are joined into one document ([`compose`]) and handed
//!    to the [`rasterize::Rasterizer`].
//!
//! The whole PDF render runs under a single deadline; expiry drops every
//! in-flight fetch and the browser process with it.

pub mod background;
pub mod compose;
pub mod formatting;
pub mod pages;
pub mod rasterize;

use crate::error::RenderError;
use crate::store::assets::AssetStore;
use background::{BackgroundCatalog, BackgroundRef, BackgroundResolver};
use common::model::formatting::FieldFormatting;
use common::model::submission::FormSubmission;
use common::model::template::{Field, PageBackground, Template};
use compose::{compose_document, compose_page, merge_values};
use formatting::{resolve, EffectiveField};
use log::{debug, warn};
use rasterize::Rasterizer;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Input of one render call. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub values: HashMap<String, Value>,
    /// Only non-empty entries override the plain value.
    pub html_values: HashMap<String, String>,
    pub formatting: HashMap<String, FieldFormatting>,
    pub custom_fields: Vec<Field>,
}

impl RenderRequest {
    /// Builds a request from loosely typed JSON maps. Non-string HTML values
    /// and malformed formatting entries are ignored.
    pub fn from_json(
        values: HashMap<String, Value>,
        html_values: &HashMap<String, Value>,
        formatting: &HashMap<String, Value>,
        custom_fields: Vec<Field>,
    ) -> Self {
        let html_values = html_values
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
            .collect();
        Self {
            values,
            html_values,
            formatting: FieldFormatting::map_from_json(formatting),
            custom_fields,
        }
    }

    pub fn from_submission(submission: &FormSubmission) -> Self {
        let empty = HashMap::new();
        Self::from_json(
            submission.form_data.clone().into_iter().collect(),
            submission.html_data.as_ref().unwrap_or(&empty),
            submission.formatting_data.as_ref().unwrap_or(&empty),
            Vec::new(),
        )
    }
}

#[derive(Clone)]
pub struct Renderer {
    backgrounds: BackgroundResolver,
    rasterizer: Arc<dyn Rasterizer>,
    deadline: Duration,
}

impl Renderer {
    pub fn new(
        catalog: Arc<dyn BackgroundCatalog>,
        assets: Arc<dyn AssetStore>,
        rasterizer: Arc<dyn Rasterizer>,
        deadline: Duration,
    ) -> Self {
        Self {
            backgrounds: BackgroundResolver::new(catalog, assets),
            rasterizer,
            deadline,
        }
    }

    /// Lets `/static/...` background references read from `dir`.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backgrounds = self.backgrounds.with_static_dir(dir);
        self
    }

    pub fn backgrounds(&self) -> &BackgroundResolver {
        &self.backgrounds
    }

    /// Composes the printable HTML document for `template`.
    pub async fn render_html(
        &self,
        template: &Template,
        request: &RenderRequest,
    ) -> Result<String, RenderError> {
        let mut fields = template.fields.clone();
        fields.extend(request.custom_fields.iter().cloned());
        let values = merge_values(&request.values, &request.html_values);

        if !template.is_multi_page() {
            let background = self.legacy_background(template).await?;
            let effective = effective_fields(fields.iter(), &request.formatting);
            let page = compose_page(&effective, &values, background.as_deref());
            return Ok(compose_document(&[page]));
        }

        let pages = pages::group_pages(&fields, &template.page_backgrounds)?;
        let mut fragments = Vec::with_capacity(pages.len());
        for page in &pages {
            let background = match page.background {
                Some(record) => self.page_background(record).await,
                None => None,
            };
            let effective = effective_fields(page.fields.iter().copied(), &request.formatting);
            fragments.push(compose_page(&effective, &values, background.as_deref()));
        }
        debug!("Composed {} page(s) for template {}", fragments.len(), template.id);
        Ok(compose_document(&fragments))
    }

    /// Renders `template` to PDF bytes within the render deadline.
    pub async fn render_pdf(
        &self,
        template: &Template,
        request: &RenderRequest,
    ) -> Result<Vec<u8>, RenderError> {
        let render = async {
            let html = self.render_html(template, request).await?;
            self.rasterizer.rasterize(&html).await
        };
        tokio::time::timeout(self.deadline, render)
            .await
            .map_err(|_| RenderError::RasterizeTimeout)?
    }

    async fn page_background(&self, record: &PageBackground) -> Option<String> {
        match self.backgrounds.record_data_uri(record).await {
            Ok(uri) => Some(uri),
            Err(e) => {
                warn!(
                    "Rendering page {} of template {} without background: {}",
                    record.page_index, record.template_id, e
                );
                None
            }
        }
    }

    /// Background of a single-page template. An unrecognised reference is
    /// fatal; a reference that cannot be loaded only blanks the page.
    async fn legacy_background(&self, template: &Template) -> Result<Option<String>, RenderError> {
        if template.svg_background.trim().is_empty() {
            return Ok(None);
        }
        let reference = BackgroundRef::parse_stored(&template.id, &template.svg_background)?;
        match self.backgrounds.data_uri(&reference).await {
            Ok(uri) => Ok(Some(uri)),
            Err(e) => {
                warn!(
                    "Rendering template {} without legacy background {}: {}",
                    template.id, reference, e
                );
                Ok(None)
            }
        }
    }
}

fn effective_fields<'a>(
    fields: impl Iterator<Item = &'a Field>,
    formatting: &HashMap<String, FieldFormatting>,
) -> Vec<EffectiveField> {
    fields.map(|field| resolve(field, formatting)).collect()
}
