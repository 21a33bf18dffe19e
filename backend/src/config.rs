//! Server configuration.
//!
//! Values come from environment variables, each with a default suitable for a
//! local development run. `PORT` takes precedence over `SERVER_PORT` so the
//! server works unchanged on hosts that inject `PORT`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Maximum accepted JSON body.
pub const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite database file holding templates, fields, page backgrounds and submissions.
    pub database_path: PathBuf,
    /// Root directory of the filesystem asset store.
    pub asset_dir: PathBuf,
    /// When set, assets live behind this HTTP base URL instead of `asset_dir`.
    pub asset_url: Option<String>,
    /// Externally visible origin used in `fileUrl`; the request host otherwise.
    pub base_url: Option<String>,
    pub static_dir: PathBuf,
    /// Headless browser binary; looked up on `PATH` when unset.
    pub chrome_path: Option<PathBuf>,
    pub render_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("fastfill.sqlite"),
            asset_dir: PathBuf::from("./storage"),
            asset_url: None,
            base_url: None,
            static_dir: PathBuf::from("./static"),
            chrome_path: None,
            render_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = get("PORT")
            .or_else(|| get("SERVER_PORT"))
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let render_timeout_secs = get("RENDER_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|s| *s > 0)
            .unwrap_or(defaults.render_timeout_secs);

        Self {
            host: get("SERVER_HOST").unwrap_or(defaults.host),
            port,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            asset_dir: get("ASSET_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.asset_dir),
            asset_url: get("ASSET_STORE_URL").map(|u| u.trim_end_matches('/').to_string()),
            base_url: get("API_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            chrome_path: get("CHROME_PATH").map(PathBuf::from),
            render_timeout_secs,
        }
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }
}
