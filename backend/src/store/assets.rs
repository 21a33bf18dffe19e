//! # Asset Store
//!
//! Holds the raw bytes of uploaded background images under opaque object names
//! (`templates/{templateId}/{unixSeconds}_page{pageIndex}.svg`). The renderer and the file
//! endpoints only see the [`AssetStore`] trait; the server picks a filesystem
//! or an HTTP object-storage implementation from its configuration.
//!
//! Operations return boxed futures so the trait stays object safe and a render
//! deadline can drop an in-flight fetch.

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
pub enum AssetError {
    NotFound(String),
    /// The remote store answered with a non-success status.
    Status(u16),
    Transport(String),
    /// Object name escapes the store root or is empty.
    InvalidRef(String),
    Io(io::Error),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound(name) => write!(f, "asset {} not found", name),
            AssetError::Status(code) => write!(f, "asset store returned status {}", code),
            AssetError::Transport(message) => write!(f, "asset store unreachable: {}", message),
            AssetError::InvalidRef(name) => write!(f, "invalid asset name: {}", name),
            AssetError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AssetError {
    fn from(value: reqwest::Error) -> Self {
        AssetError::Transport(value.to_string())
    }
}

pub trait AssetStore: Send + Sync {
    /// Stores `bytes` under `name`, returning the stored size.
    fn put<'a>(
        &'a self,
        name: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<u64, AssetError>>;

    fn fetch_bytes<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>>;

    /// Deleting a missing object is not an error.
    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), AssetError>>;
}

/// Object name for a freshly uploaded file:
/// `templates/{templateId}/{unixSeconds}_page{pageIndex}{ext}`.
///
/// The page index keeps two pages uploaded within the same second apart.
pub fn object_name(template_id: &str, page_index: u32, original_filename: &str) -> String {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!(
        "templates/{}/{}_page{}{}",
        template_id,
        Utc::now().timestamp(),
        page_index,
        ext
    )
}

/// Assets as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(name);
        let safe = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AssetError::InvalidRef(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetStore for LocalAssetStore {
    fn put<'a>(
        &'a self,
        name: &'a str,
        bytes: Vec<u8>,
        _content_type: &'a str,
    ) -> BoxFuture<'a, Result<u64, AssetError>> {
        async move {
            let path = self.path_for(name)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(AssetError::Io)?;
            }
            let size = bytes.len() as u64;
            tokio::fs::write(&path, bytes).await.map_err(AssetError::Io)?;
            Ok(size)
        }
        .boxed()
    }

    fn fetch_bytes<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        async move {
            let path = self.path_for(name)?;
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    Err(AssetError::NotFound(name.to_string()))
                }
                Err(err) => Err(AssetError::Io(err)),
            }
        }
        .boxed()
    }

    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), AssetError>> {
        async move {
            let path = self.path_for(name)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(AssetError::Io(err)),
            }
        }
        .boxed()
    }
}

/// Assets behind an HTTP object store: `GET`/`PUT`/`DELETE {base}/{name}`.
#[derive(Debug, Clone)]
pub struct HttpAssetStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAssetStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AssetError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, name: &str) -> Result<String, AssetError> {
        let name = name.trim_start_matches('/');
        if name.is_empty() || name.split('/').any(|s| s == "..") {
            return Err(AssetError::InvalidRef(name.to_string()));
        }
        Ok(format!("{}/{}", self.base_url, name))
    }
}

impl AssetStore for HttpAssetStore {
    fn put<'a>(
        &'a self,
        name: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<u64, AssetError>> {
        async move {
            let url = self.url_for(name)?;
            let size = bytes.len() as u64;
            let response = self
                .client
                .put(url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .header(reqwest::header::CACHE_CONTROL, "public, max-age=86400")
                .body(bytes)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(AssetError::Status(response.status().as_u16()));
            }
            Ok(size)
        }
        .boxed()
    }

    fn fetch_bytes<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        async move {
            let url = self.url_for(name)?;
            let response = self.client.get(url).send().await?;
            match response.status() {
                StatusCode::NOT_FOUND => Err(AssetError::NotFound(name.to_string())),
                status if !status.is_success() => Err(AssetError::Status(status.as_u16())),
                _ => Ok(response.bytes().await?.to_vec()),
            }
        }
        .boxed()
    }

    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), AssetError>> {
        async move {
            let url = self.url_for(name)?;
            let response = self.client.delete(url).send().await?;
            match response.status() {
                StatusCode::NOT_FOUND => Ok(()),
                status if !status.is_success() => Err(AssetError::Status(status.as_u16())),
                _ => Ok(()),
            }
        }
        .boxed()
    }
}
