use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Status given to submissions created without one.
pub const DEFAULT_SUBMISSION_STATUS: &str = "draft";

/// A filled-in form stored against its template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub id: String,
    pub template_id: String,
    pub form_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting_data: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_data: Option<HashMap<String, Value>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
