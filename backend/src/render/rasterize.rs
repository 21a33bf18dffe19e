//! # Document Rasterizer
//!
//! Prints a composed HTML document to PDF with a headless Chrome/Chromium.
//!
//! ## Workflow
//!
//! 1. A private temporary directory is created for the request. It holds the
//!    HTML input, the PDF output and the browser profile.
//! 2. A fresh browser process is launched with `--print-to-pdf`. The command
//!    line has no paper, margin or background switches, so the document owns
//!    its print geometry: A4 (8.27in × 11.69in) and zero margins through an
//!    `@page` rule, background images through `print-color-adjust: exact`.
//!    [`compose::compose_document`](crate::render::compose::compose_document)
//!    emits both; HTML from anywhere else must carry them too or Chrome falls
//!    back to its default Letter page with margins and no backgrounds.
//! 3. The process is awaited under the rasterizer's timeout. It is spawned
//!    with `kill_on_drop`, so a timeout or a dropped render future kills it.
//! 4. The PDF is read back and the directory is removed when it goes out of
//!    scope, whatever the outcome.

use crate::error::RenderError;
use futures_util::future::{BoxFuture, FutureExt};
use log::debug;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const BROWSER_CANDIDATES: [&str; 4] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Converts a complete HTML document into PDF bytes.
pub trait Rasterizer: Send + Sync {
    fn rasterize<'a>(&'a self, html: &'a str) -> BoxFuture<'a, Result<Vec<u8>, RenderError>>;
}

#[derive(Debug, Clone)]
pub struct ChromeRasterizer {
    binary: PathBuf,
    timeout: Duration,
}

impl ChromeRasterizer {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Uses `configured` when given, otherwise the first known browser
    /// executable found on `PATH`.
    pub fn discover(configured: Option<&Path>, timeout: Duration) -> Result<Self, RenderError> {
        if let Some(path) = configured {
            if path.is_file() {
                return Ok(Self::new(path, timeout));
            }
            return Err(RenderError::RasterizeFailed(format!(
                "browser binary {} does not exist",
                path.display()
            )));
        }

        let search_path = env::var_os("PATH").unwrap_or_default();
        env::split_paths(&search_path)
            .flat_map(|dir| BROWSER_CANDIDATES.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
            .map(|binary| Self::new(binary, timeout))
            .ok_or_else(|| {
                RenderError::RasterizeFailed("no Chrome/Chromium binary found on PATH".to_string())
            })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, workdir: &Path, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--hide-scrollbars")
            .arg("--no-pdf-header-footer")
            .arg(format!("--user-data-dir={}", workdir.join("profile").display()))
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn print(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let failed = |what: &str, err: std::io::Error| {
            RenderError::RasterizeFailed(format!("{}: {}", what, err))
        };

        let workdir = tempfile::tempdir().map_err(|e| failed("cannot create work directory", e))?;
        let input = workdir.path().join("document.html");
        let output = workdir.path().join("document.pdf");
        tokio::fs::write(&input, html)
            .await
            .map_err(|e| failed("cannot write document", e))?;

        let child = self
            .command(workdir.path(), &input, &output)
            .spawn()
            .map_err(|e| failed(&format!("cannot launch {}", self.binary.display()), e))?;
        debug!("Browser started for {}", input.display());

        let finished = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RenderError::RasterizeTimeout)?
            .map_err(|e| failed("browser did not finish", e))?;

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            return Err(RenderError::RasterizeFailed(format!(
                "browser exited with {}: {}",
                finished.status,
                stderr.trim()
            )));
        }

        let pdf = tokio::fs::read(&output)
            .await
            .map_err(|e| failed("browser produced no PDF", e))?;
        if !pdf.starts_with(b"%PDF") {
            return Err(RenderError::RasterizeFailed(
                "browser output is not a PDF document".to_string(),
            ));
        }
        Ok(pdf)
    }
}

impl Rasterizer for ChromeRasterizer {
    fn rasterize<'a>(&'a self, html: &'a str) -> BoxFuture<'a, Result<Vec<u8>, RenderError>> {
        self.print(html).boxed()
    }
}
