//! # Background Resolver
//!
//! Turns a stored background reference into image bytes or an embeddable
//! `data:` URI. Three reference shapes exist in stored templates because
//! backgrounds moved from one-per-template to one-per-page:
//!
//! - `data:...` inline images, used as they are;
//! - `/api/files/svg/{templateId}/page/{pageIndex}` (current, per page);
//! - `/api/files/svg/{templateId}` (current, single background);
//! - `templates/{templateId}/{filename}` (legacy object path);
//! - `/static/{path}` (a file shipped under the static directory, used by
//!   templates created from the bundled form SVG catalog).
//!
//! Absolute URLs (`http(s)://host/...`) of the path shapes are accepted too;
//! the origin is ignored. Anything else is [`RenderError::UnsupportedReferenceFormat`].
//!
//! ## Workflow
//!
//! 1. [`BackgroundRef::parse`] classifies the reference.
//! 2. The page background records of the template are read from the
//!    [`BackgroundCatalog`] on the blocking pool.
//! 3. An [`AssetLookup`] picks one record, falling back to the most recently
//!    created one when its own criterion matches nothing.
//! 4. The record's object name is fetched from the [`AssetStore`].
//!
//! Static references skip steps 2 to 4 and read the file below the resolver's
//! static directory. Without one they are [`RenderError::AssetNotFound`].

use crate::error::RenderError;
use crate::store::assets::AssetStore;
use crate::store::templates::TemplateStore;
use crate::store::StoreError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::model::template::PageBackground;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SVG_MIME: &str = "image/svg+xml";

static URL_ORIGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^/]+").expect("origin pattern is valid"));

/// A parsed background reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundRef {
    EmbeddedData(String),
    CurrentPerPage { template_id: String, page_index: u32 },
    CurrentLegacySingle { template_id: String },
    LegacyPath { template_id: String, filename: String },
    /// Relative path below the static directory, without `..` or empty segments.
    StaticFile(String),
}

impl BackgroundRef {
    pub fn parse(reference: &str) -> Result<Self, RenderError> {
        let reference = reference.trim();
        if reference.starts_with("data:") {
            return Ok(BackgroundRef::EmbeddedData(reference.to_string()));
        }

        let unsupported = || RenderError::UnsupportedReferenceFormat(reference.to_string());
        let path = URL_ORIGIN.replace(reference, "");
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match segments.as_slice() {
            ["api", "files", "svg", template_id, "page", page] if !template_id.is_empty() => {
                let page_index = page.parse().map_err(|_| unsupported())?;
                Ok(BackgroundRef::CurrentPerPage {
                    template_id: template_id.to_string(),
                    page_index,
                })
            }
            ["api", "files", "svg", template_id] if !template_id.is_empty() => {
                Ok(BackgroundRef::CurrentLegacySingle {
                    template_id: template_id.to_string(),
                })
            }
            ["templates", template_id, filename]
                if !template_id.is_empty() && !filename.is_empty() =>
            {
                Ok(BackgroundRef::LegacyPath {
                    template_id: template_id.to_string(),
                    filename: filename.to_string(),
                })
            }
            ["static", rest @ ..]
                if !rest.is_empty() && rest.iter().all(|s| !s.is_empty() && *s != ".." && *s != ".") =>
            {
                Ok(BackgroundRef::StaticFile(rest.join("/")))
            }
            _ => Err(unsupported()),
        }
    }

    /// Parses the legacy reference stored on template `template_id`. Besides
    /// the shapes [`BackgroundRef::parse`] knows, older cleanups left the bare
    /// template ID there; it means the template's single background.
    pub fn parse_stored(template_id: &str, reference: &str) -> Result<Self, RenderError> {
        if !template_id.is_empty() && reference.trim() == template_id {
            return Ok(BackgroundRef::CurrentLegacySingle {
                template_id: template_id.to_string(),
            });
        }
        Self::parse(reference)
    }

    /// Current-format reference to one page of a template.
    pub fn page(template_id: &str, page_index: u32) -> Self {
        BackgroundRef::CurrentPerPage {
            template_id: template_id.to_string(),
            page_index,
        }
    }

    /// How the reference selects among the template's stored backgrounds.
    pub fn lookup(&self) -> Option<(&str, AssetLookup)> {
        match self {
            BackgroundRef::EmbeddedData(_) | BackgroundRef::StaticFile(_) => None,
            BackgroundRef::CurrentPerPage { template_id, page_index } => {
                Some((template_id.as_str(), AssetLookup::Page(*page_index)))
            }
            BackgroundRef::CurrentLegacySingle { template_id } => {
                Some((template_id.as_str(), AssetLookup::Latest))
            }
            BackgroundRef::LegacyPath { template_id, filename } => {
                let stem = Path::new(filename)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(filename.as_str());
                Some((template_id.as_str(), AssetLookup::NameContains(stem.to_string())))
            }
        }
    }
}

impl fmt::Display for BackgroundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundRef::EmbeddedData(_) => write!(f, "embedded image"),
            BackgroundRef::CurrentPerPage { template_id, page_index } => {
                write!(f, "/api/files/svg/{}/page/{}", template_id, page_index)
            }
            BackgroundRef::CurrentLegacySingle { template_id } => {
                write!(f, "/api/files/svg/{}", template_id)
            }
            BackgroundRef::LegacyPath { template_id, filename } => {
                write!(f, "templates/{}/{}", template_id, filename)
            }
            BackgroundRef::StaticFile(path) => write!(f, "/static/{}", path),
        }
    }
}

/// Selection criterion over a template's page backgrounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLookup {
    Page(u32),
    /// Case-sensitive substring of the stored or original filename.
    NameContains(String),
    Latest,
}

impl AssetLookup {
    /// Parses an internal asset identifier: `page_{n}` selects a page, any
    /// other text is matched against filenames.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.strip_prefix("page_").map(str::parse::<u32>) {
            Some(Ok(page)) => AssetLookup::Page(page),
            _ if identifier.is_empty() => AssetLookup::Latest,
            _ => AssetLookup::NameContains(identifier.to_string()),
        }
    }

    /// Picks a background, falling back to the most recent one.
    pub fn select<'a>(&self, backgrounds: &'a [PageBackground]) -> Option<&'a PageBackground> {
        let matched = match self {
            AssetLookup::Page(page) => {
                most_recent(backgrounds.iter().filter(|b| b.page_index == *page))
            }
            AssetLookup::NameContains(needle) => most_recent(backgrounds.iter().filter(|b| {
                b.filename.contains(needle.as_str()) || b.original_name.contains(needle.as_str())
            })),
            AssetLookup::Latest => None,
        };
        matched.or_else(|| most_recent(backgrounds.iter()))
    }
}

fn most_recent<'a>(
    backgrounds: impl Iterator<Item = &'a PageBackground>,
) -> Option<&'a PageBackground> {
    backgrounds.max_by_key(|b| (b.created_at, b.id))
}

/// Source of page background records for a template.
pub trait BackgroundCatalog: Send + Sync {
    fn page_backgrounds(&self, template_id: &str) -> Result<Vec<PageBackground>, StoreError>;
}

impl BackgroundCatalog for TemplateStore {
    fn page_backgrounds(&self, template_id: &str) -> Result<Vec<PageBackground>, StoreError> {
        TemplateStore::page_backgrounds(self, template_id)
    }
}

#[derive(Clone)]
pub struct BackgroundResolver {
    catalog: Arc<dyn BackgroundCatalog>,
    assets: Arc<dyn AssetStore>,
    static_dir: Option<PathBuf>,
}

impl BackgroundResolver {
    pub fn new(catalog: Arc<dyn BackgroundCatalog>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            catalog,
            assets,
            static_dir: None,
        }
    }

    /// Directory that `/static/...` references are read from.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Raw image bytes behind `reference`. Embedded images are decoded
    /// without touching the store.
    pub async fn fetch_bytes(&self, reference: &BackgroundRef) -> Result<Vec<u8>, RenderError> {
        if let BackgroundRef::StaticFile(path) = reference {
            return self.read_static(path, reference).await;
        }
        match reference.lookup() {
            None => decode_embedded(reference),
            Some((template_id, lookup)) => {
                let background = self.locate(template_id, &lookup, reference).await?;
                Ok(self.assets.fetch_bytes(&background.asset_ref).await?)
            }
        }
    }

    /// Fetches by internal identifier (`page_2`, a filename stem, or empty
    /// for the most recent background).
    pub async fn fetch_by_identifier(
        &self,
        template_id: &str,
        identifier: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let lookup = AssetLookup::from_identifier(identifier);
        let label = format!("{}/{}", template_id, identifier);
        let backgrounds = self.backgrounds(template_id).await?;
        let background = lookup
            .select(&backgrounds)
            .ok_or(RenderError::AssetNotFound(label))?;
        Ok(self.assets.fetch_bytes(&background.asset_ref).await?)
    }

    /// `data:` URI suitable for a CSS `background-image`.
    pub async fn data_uri(&self, reference: &BackgroundRef) -> Result<String, RenderError> {
        if let BackgroundRef::EmbeddedData(uri) = reference {
            return Ok(uri.clone());
        }
        let bytes = self.fetch_bytes(reference).await?;
        Ok(encode_data_uri(&bytes))
    }

    /// `data:` URI of an already loaded background record, skipping the
    /// catalog lookup.
    pub async fn record_data_uri(&self, background: &PageBackground) -> Result<String, RenderError> {
        let bytes = self.assets.fetch_bytes(&background.asset_ref).await?;
        Ok(encode_data_uri(&bytes))
    }

    async fn read_static(&self, path: &str, reference: &BackgroundRef) -> Result<Vec<u8>, RenderError> {
        let dir = self
            .static_dir
            .as_ref()
            .ok_or_else(|| RenderError::AssetNotFound(reference.to_string()))?;
        match tokio::fs::read(dir.join(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RenderError::AssetNotFound(reference.to_string()))
            }
            Err(e) => Err(RenderError::FetchFailed(format!("{}: {}", reference, e))),
        }
    }

    async fn locate(
        &self,
        template_id: &str,
        lookup: &AssetLookup,
        reference: &BackgroundRef,
    ) -> Result<PageBackground, RenderError> {
        let backgrounds = self.backgrounds(template_id).await?;
        lookup
            .select(&backgrounds)
            .cloned()
            .ok_or_else(|| RenderError::AssetNotFound(reference.to_string()))
    }

    async fn backgrounds(&self, template_id: &str) -> Result<Vec<PageBackground>, RenderError> {
        let catalog = Arc::clone(&self.catalog);
        let template_id = template_id.to_string();
        let backgrounds = tokio::task::spawn_blocking(move || catalog.page_backgrounds(&template_id))
            .await
            .map_err(|e| RenderError::FetchFailed(format!("background lookup task failed: {}", e)))??;
        Ok(backgrounds)
    }
}

fn encode_data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", SVG_MIME, STANDARD.encode(bytes))
}

fn decode_embedded(reference: &BackgroundRef) -> Result<Vec<u8>, RenderError> {
    let BackgroundRef::EmbeddedData(uri) = reference else {
        return Err(RenderError::UnsupportedReferenceFormat(reference.to_string()));
    };
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| RenderError::UnsupportedReferenceFormat("malformed data URI".to_string()))?;
    if header.ends_with(";base64") {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| RenderError::UnsupportedReferenceFormat(format!("invalid base64 data URI: {}", e)))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}
