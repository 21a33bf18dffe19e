//! # Form Submission Store
//!
//! Submissions keep their value map, and the optional formatting and HTML maps,
//! as JSON text columns. They are not tied to the template row by a foreign key:
//! deleting a template leaves its submissions in place.

use crate::store::{Database, StoreError};
use chrono::Utc;
use common::model::submission::FormSubmission;
use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;
use std::collections::HashMap;

const SUBMISSION_COLUMNS: &str =
    "id, template_id, form_data, formatting_data, html_data, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct FormStore {
    db: Database,
}

/// Raw row before the JSON columns are decoded.
struct SubmissionRow {
    submission: FormSubmission,
    form_data: String,
    formatting_data: Option<String>,
    html_data: Option<String>,
}

impl FormStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, submission: &FormSubmission) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        conn.execute(
            &format!(
                "INSERT INTO form_submissions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                SUBMISSION_COLUMNS
            ),
            params![
                submission.id,
                submission.template_id,
                serde_json::to_string(&submission.form_data)?,
                encode_map(&submission.formatting_data)?,
                encode_map(&submission.html_data)?,
                submission.status,
                submission.created_at,
                submission.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<FormSubmission>, StoreError> {
        let conn = self.db.connect()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM form_submissions WHERE id = ?1", SUBMISSION_COLUMNS),
                params![id],
                submission_from_row,
            )
            .optional()?;
        row.map(decode).transpose()
    }

    /// Submissions of one template, newest first.
    pub fn get_by_template_id(&self, template_id: &str) -> Result<Vec<FormSubmission>, StoreError> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM form_submissions WHERE template_id = ?1 ORDER BY created_at DESC",
            SUBMISSION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![template_id], submission_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode).collect()
    }

    /// Writes back values, maps and status, bumping `updated_at`.
    pub fn update(&self, submission: &FormSubmission) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        let changed = conn.execute(
            "UPDATE form_submissions
             SET form_data = ?2, formatting_data = ?3, html_data = ?4, status = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                submission.id,
                serde_json::to_string(&submission.form_data)?,
                encode_map(&submission.formatting_data)?,
                encode_map(&submission.html_data)?,
                submission.status,
                Utc::now(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("form submission {}", submission.id)));
        }
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        conn.execute("DELETE FROM form_submissions WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn encode_map(map: &Option<HashMap<String, Value>>) -> Result<Option<String>, StoreError> {
    map.as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(StoreError::from)
}

fn decode_map(text: Option<String>) -> Result<Option<HashMap<String, Value>>, StoreError> {
    text.map(|t| serde_json::from_str(&t))
        .transpose()
        .map_err(StoreError::from)
}

fn submission_from_row(row: &Row) -> rusqlite::Result<SubmissionRow> {
    Ok(SubmissionRow {
        submission: FormSubmission {
            id: row.get(0)?,
            template_id: row.get(1)?,
            form_data: Default::default(),
            formatting_data: None,
            html_data: None,
            status: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        },
        form_data: row.get(2)?,
        formatting_data: row.get(3)?,
        html_data: row.get(4)?,
    })
}

fn decode(row: SubmissionRow) -> Result<FormSubmission, StoreError> {
    Ok(FormSubmission {
        form_data: serde_json::from_str(&row.form_data)?,
        formatting_data: decode_map(row.formatting_data)?,
        html_data: decode_map(row.html_data)?,
        ..row.submission
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::submission::DEFAULT_SUBMISSION_STATUS;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, FormStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("forms.sqlite")).unwrap();
        (dir, FormStore::new(db))
    }

    fn submission(id: &str, template_id: &str) -> FormSubmission {
        let now = Utc::now();
        let form_data = json!({ "name": "Alice", "age": 31 });
        FormSubmission {
            id: id.to_string(),
            template_id: template_id.to_string(),
            form_data: form_data.as_object().cloned().unwrap(),
            formatting_data: Some(HashMap::from([(
                "name".to_string(),
                json!({ "fontWeight": "bold" }),
            )])),
            html_data: None,
            status: DEFAULT_SUBMISSION_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn round_trips_json_columns() {
        let (_dir, store) = store();
        store.create(&submission("S1", "T1")).unwrap();

        let loaded = store.get_by_id("S1").unwrap().unwrap();
        assert_eq!(loaded.form_data["name"], json!("Alice"));
        assert_eq!(loaded.form_data["age"], json!(31));
        assert_eq!(
            loaded.formatting_data.unwrap()["name"],
            json!({ "fontWeight": "bold" })
        );
        assert!(loaded.html_data.is_none());
        assert_eq!(loaded.status, "draft");
    }

    #[test]
    fn update_and_delete() {
        let (_dir, store) = store();
        let mut sub = submission("S1", "T1");
        store.create(&sub).unwrap();

        sub.status = "submitted".to_string();
        sub.html_data = Some(HashMap::from([("name".to_string(), json!("<b>Alice</b>"))]));
        store.update(&sub).unwrap();
        let loaded = store.get_by_id("S1").unwrap().unwrap();
        assert_eq!(loaded.status, "submitted");
        assert_eq!(loaded.html_data.unwrap()["name"], json!("<b>Alice</b>"));

        store.delete("S1").unwrap();
        assert!(store.get_by_id("S1").unwrap().is_none());
        assert!(matches!(store.update(&sub), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn lists_by_template() {
        let (_dir, store) = store();
        store.create(&submission("S1", "T1")).unwrap();
        store.create(&submission("S2", "T1")).unwrap();
        store.create(&submission("S3", "T2")).unwrap();

        let listed = store.get_by_template_id("T1").unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|s| s.template_id == "T1"));
    }
}
