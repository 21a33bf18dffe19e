use crate::store::assets::AssetError;
use crate::store::StoreError;
use std::fmt;

/// Everything that can stop a template from becoming a PDF.
#[derive(Debug)]
pub enum RenderError {
    /// Template, submission or asset record absent.
    NotFound(String),
    /// Background reference matches none of the known shapes.
    UnsupportedReferenceFormat(String),
    /// No background asset left after the lookup fallbacks.
    AssetNotFound(String),
    /// Asset store answered with an error status or could not be reached.
    FetchFailed(String),
    /// Multi-page grouping found no page with fields or a background.
    NoRenderablePages,
    RasterizeFailed(String),
    RasterizeTimeout,
    Store(StoreError),
}

impl RenderError {
    /// Message shown to HTTP callers; details stay in the log.
    pub fn fault_message(&self) -> &'static str {
        match self {
            RenderError::RasterizeFailed(_) | RenderError::RasterizeTimeout => {
                "Failed to generate PDF"
            }
            _ => "Failed to generate HTML",
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotFound(what) => write!(f, "{} not found", what),
            RenderError::UnsupportedReferenceFormat(reference) => {
                write!(f, "unsupported background reference format: {}", reference)
            }
            RenderError::AssetNotFound(reference) => {
                write!(f, "background asset not found for {}", reference)
            }
            RenderError::FetchFailed(message) => write!(f, "failed to fetch asset: {}", message),
            RenderError::NoRenderablePages => write!(f, "template has no renderable pages"),
            RenderError::RasterizeFailed(message) => {
                write!(f, "failed to rasterize document: {}", message)
            }
            RenderError::RasterizeTimeout => write!(f, "rasterization timed out"),
            RenderError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RenderError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => RenderError::NotFound(what),
            other => RenderError::Store(other),
        }
    }
}

impl From<AssetError> for RenderError {
    fn from(value: AssetError) -> Self {
        match value {
            AssetError::NotFound(name) => RenderError::AssetNotFound(name),
            other => RenderError::FetchFailed(other.to_string()),
        }
    }
}
