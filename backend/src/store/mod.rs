//! # Persistence
//!
//! SQLite-backed stores for templates (with their fields and page backgrounds)
//! and form submissions, plus the asset store that holds background bytes.
//!
//! A [`Database`] only remembers where the database file lives; every store
//! call opens its own short-lived connection. That keeps the stores `Send +
//! Sync` and cheap to clone into request handlers, and no connection is ever
//! held across an `.await`.

pub mod assets;
pub mod forms;
pub mod templates;

use rusqlite::Connection;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a lock held by another handler.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS templates (
    id             TEXT PRIMARY KEY,
    display_name   TEXT NOT NULL,
    description    TEXT NOT NULL DEFAULT '',
    category       TEXT NOT NULL DEFAULT '',
    preview_image  TEXT NOT NULL DEFAULT '',
    svg_background TEXT NOT NULL DEFAULT '',
    data_interface TEXT NOT NULL DEFAULT '',
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS template_fields (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    template_id          TEXT NOT NULL REFERENCES templates(id) ON DELETE CASCADE,
    name                 TEXT NOT NULL,
    field_type           TEXT NOT NULL,
    required             INTEGER NOT NULL DEFAULT 0,
    data_key             TEXT NOT NULL,
    is_address_component INTEGER NOT NULL DEFAULT 0,
    page_index           INTEGER NOT NULL DEFAULT 0,
    position_top         INTEGER NOT NULL DEFAULT 0,
    position_left        INTEGER NOT NULL DEFAULT 0,
    position_width       INTEGER NOT NULL DEFAULT 0,
    position_height      INTEGER NOT NULL DEFAULT 0,
    font_size            INTEGER,
    font_weight          TEXT,
    font_style           TEXT,
    text_decoration      TEXT,
    text_color           TEXT,
    font_family          TEXT,
    options              TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_template_fields_template ON template_fields(template_id);

CREATE TABLE IF NOT EXISTS svg_files (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    template_id   TEXT NOT NULL REFERENCES templates(id) ON DELETE CASCADE,
    filename      TEXT NOT NULL,
    original_name TEXT NOT NULL DEFAULT '',
    gcs_path      TEXT NOT NULL,
    file_size     INTEGER NOT NULL DEFAULT 0,
    mime_type     TEXT NOT NULL DEFAULT '',
    page_index    INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    UNIQUE (template_id, page_index)
);

CREATE TABLE IF NOT EXISTS form_submissions (
    id              TEXT PRIMARY KEY,
    template_id     TEXT NOT NULL,
    form_data       TEXT NOT NULL,
    formatting_data TEXT,
    html_data       TEXT,
    status          TEXT NOT NULL DEFAULT 'draft',
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_form_submissions_template ON form_submissions(template_id);
";

#[derive(Debug)]
pub enum StoreError {
    Database(rusqlite::Error),
    Serialization(serde_json::Error),
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "database error: {}", err),
            StoreError::Serialization(err) => write!(f, "serialization error: {}", err),
            StoreError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(err) => Some(err),
            StoreError::Serialization(err) => Some(err),
            StoreError::NotFound(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Database(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serialization(value)
    }
}

/// Location of the SQLite database shared by all stores.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Points at `path` and creates any missing tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Self {
            path: path.as_ref().to_path_buf(),
        };
        db.connect()?.execute_batch(SCHEMA)?;
        Ok(db)
    }

    /// Opens a fresh connection with foreign keys enforced.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        Database::open(&path).unwrap();
        let db = Database::open(&path).unwrap();

        let count: i64 = db
            .connect()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('templates', 'template_fields', 'svg_files', 'form_submissions')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }
}
