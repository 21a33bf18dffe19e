//! Data model shared between the form-filling backend and its clients.
//!
//! Everything here is plain serde data: templates with their positioned fields
//! and per-page backgrounds, form submissions, the per-field formatting bag and
//! the request/response payloads of the HTTP API. JSON names are camelCase to
//! stay wire-compatible with templates and submissions stored by older clients.

pub mod model;
pub mod requests;
pub mod responses;
