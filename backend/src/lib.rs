//! Form template backend: template and submission CRUD over SQLite, SVG page
//! backgrounds in an asset store, and the rendering pipeline that turns a
//! filled template into a PDF.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod render;
pub mod services;
pub mod state;
pub mod store;
