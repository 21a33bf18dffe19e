//! # Template Store
//!
//! Reads and writes templates together with the rows they own: the ordered
//! field list (`template_fields`) and the per-page background metadata
//! (`svg_files`). Reads always return a fully hydrated [`Template`]: fields in
//! their stored order, page backgrounds in creation order.
//!
//! Updates follow the partial-update semantics existing clients rely on: empty
//! strings in the incoming template leave the stored column untouched, while the
//! field list is always replaced wholesale.

use crate::store::{Database, StoreError};
use chrono::Utc;
use common::model::template::{Field, PageBackground, Position, Template};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TEMPLATE_COLUMNS: &str = "id, display_name, description, category, preview_image, \
     svg_background, data_interface, created_at, updated_at";

const FIELD_COLUMNS: &str = "id, name, field_type, required, data_key, is_address_component, \
     page_index, position_top, position_left, position_width, position_height, font_size, \
     font_weight, font_style, text_decoration, text_color, font_family, options";

const BACKGROUND_COLUMNS: &str =
    "id, template_id, page_index, filename, original_name, gcs_path, file_size, mime_type, created_at";

/// A template's legacy background reference, as scanned by the cleanup tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyBackground {
    pub template_id: String,
    pub display_name: String,
    pub svg_background: String,
}

/// Outcome of [`TemplateStore::replace_page_background`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundReplacement {
    pub stored: PageBackground,
    /// The record that held the page before, whose bytes are now unreferenced.
    pub replaced: Option<PageBackground>,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    db: Database,
}

impl TemplateStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All templates, newest first.
    pub fn get_all(&self) -> Result<Vec<Template>, StoreError> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM templates ORDER BY created_at DESC, id",
            TEMPLATE_COLUMNS
        ))?;
        let mut templates = stmt
            .query_map([], template_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for template in &mut templates {
            hydrate(&conn, template)?;
        }
        Ok(templates)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Template>, StoreError> {
        let conn = self.db.connect()?;
        let template = conn
            .query_row(
                &format!("SELECT {} FROM templates WHERE id = ?1", TEMPLATE_COLUMNS),
                params![id],
                template_from_row,
            )
            .optional()?;
        match template {
            Some(mut template) => {
                hydrate(&conn, &mut template)?;
                Ok(Some(template))
            }
            None => Ok(None),
        }
    }

    pub fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.db.connect()?;
        let found = conn
            .query_row("SELECT 1 FROM templates WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Inserts the template and its fields. Page backgrounds are managed by upload.
    pub fn create(&self, template: &Template) -> Result<(), StoreError> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO templates ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                TEMPLATE_COLUMNS
            ),
            params![
                template.id,
                template.display_name,
                template.description,
                template.category,
                template.preview_image,
                template.svg_background,
                template.data_interface,
                template.created_at,
                template.updated_at,
            ],
        )?;
        insert_fields(&tx, &template.id, &template.fields)?;
        tx.commit()?;
        Ok(())
    }

    /// Updates non-empty metadata and replaces the field list.
    pub fn update(&self, template: &Template) -> Result<(), StoreError> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE templates SET
                display_name   = COALESCE(NULLIF(?2, ''), display_name),
                description    = COALESCE(NULLIF(?3, ''), description),
                category       = COALESCE(NULLIF(?4, ''), category),
                preview_image  = COALESCE(NULLIF(?5, ''), preview_image),
                svg_background = COALESCE(NULLIF(?6, ''), svg_background),
                data_interface = COALESCE(NULLIF(?7, ''), data_interface),
                updated_at     = ?8
             WHERE id = ?1",
            params![
                template.id,
                template.display_name,
                template.description,
                template.category,
                template.preview_image,
                template.svg_background,
                template.data_interface,
                Utc::now(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("template {}", template.id)));
        }
        tx.execute(
            "DELETE FROM template_fields WHERE template_id = ?1",
            params![template.id],
        )?;
        insert_fields(&tx, &template.id, &template.fields)?;
        tx.commit()?;
        Ok(())
    }

    /// Deletes the template with its fields and background records.
    ///
    /// Returns the removed backgrounds so the caller can drop their stored bytes.
    pub fn delete(&self, id: &str) -> Result<Vec<PageBackground>, StoreError> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction()?;
        let backgrounds = load_backgrounds(&tx, id)?;
        tx.execute("DELETE FROM template_fields WHERE template_id = ?1", params![id])?;
        tx.execute("DELETE FROM svg_files WHERE template_id = ?1", params![id])?;
        tx.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(backgrounds)
    }

    /// Page backgrounds of a template in creation order.
    pub fn page_backgrounds(&self, template_id: &str) -> Result<Vec<PageBackground>, StoreError> {
        let conn = self.db.connect()?;
        load_backgrounds(&conn, template_id)
    }

    pub fn find_page_background(
        &self,
        template_id: &str,
        page_index: u32,
    ) -> Result<Option<PageBackground>, StoreError> {
        let conn = self.db.connect()?;
        find_background(&conn, template_id, page_index)
    }

    /// Stores background metadata and returns it with its assigned id.
    pub fn insert_page_background(
        &self,
        background: &PageBackground,
    ) -> Result<PageBackground, StoreError> {
        let conn = self.db.connect()?;
        insert_background(&conn, background)
    }

    /// Swaps the background of one page in a single transaction: the record
    /// already stored for the page is removed, `background` inserted, and for
    /// page 0 the legacy reference set to `legacy_reference`.
    ///
    /// Nothing is written when any step fails.
    pub fn replace_page_background(
        &self,
        background: &PageBackground,
        legacy_reference: &str,
    ) -> Result<BackgroundReplacement, StoreError> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction()?;
        let replaced = find_background(&tx, &background.template_id, background.page_index)?;
        if let Some(previous) = &replaced {
            tx.execute("DELETE FROM svg_files WHERE id = ?1", params![previous.id])?;
        }
        let stored = insert_background(&tx, background)?;
        if stored.page_index == 0 {
            tx.execute(
                "UPDATE templates SET svg_background = ?2, updated_at = ?3 WHERE id = ?1",
                params![stored.template_id, legacy_reference, Utc::now()],
            )?;
        }
        tx.commit()?;
        Ok(BackgroundReplacement { stored, replaced })
    }

    /// Removes one background record, returning it if it existed.
    pub fn delete_page_background(&self, id: i64) -> Result<Option<PageBackground>, StoreError> {
        let conn = self.db.connect()?;
        let background = conn
            .query_row(
                &format!("SELECT {} FROM svg_files WHERE id = ?1", BACKGROUND_COLUMNS),
                params![id],
                background_from_row,
            )
            .optional()?;
        if background.is_some() {
            conn.execute("DELETE FROM svg_files WHERE id = ?1", params![id])?;
        }
        Ok(background)
    }

    /// Overwrites the legacy background reference. Returns false for an unknown template.
    pub fn set_svg_background(&self, template_id: &str, reference: &str) -> Result<bool, StoreError> {
        let conn = self.db.connect()?;
        let changed = conn.execute(
            "UPDATE templates SET svg_background = ?2, updated_at = ?3 WHERE id = ?1",
            params![template_id, reference, Utc::now()],
        )?;
        Ok(changed > 0)
    }

    /// Templates that carry a non-empty legacy background reference.
    pub fn list_svg_backgrounds(&self) -> Result<Vec<LegacyBackground>, StoreError> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, display_name, svg_background FROM templates
             WHERE svg_background <> '' ORDER BY created_at",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LegacyBackground {
                    template_id: row.get(0)?,
                    display_name: row.get(1)?,
                    svg_background: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn template_from_row(row: &Row) -> rusqlite::Result<Template> {
    Ok(Template {
        id: row.get(0)?,
        display_name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        preview_image: row.get(4)?,
        svg_background: row.get(5)?,
        data_interface: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        fields: Vec::new(),
        page_backgrounds: Vec::new(),
    })
}

fn field_from_row(row: &Row) -> rusqlite::Result<Field> {
    let options: String = row.get(17)?;
    Ok(Field {
        id: row.get(0)?,
        name: row.get(1)?,
        field_type: row.get(2)?,
        required: row.get(3)?,
        data_key: row.get(4)?,
        is_address_component: row.get(5)?,
        page_index: row.get(6)?,
        position: Position {
            top: row.get(7)?,
            left: row.get(8)?,
            width: row.get(9)?,
            height: row.get(10)?,
        },
        font_size: row.get(11)?,
        font_weight: row.get(12)?,
        font_style: row.get(13)?,
        text_decoration: row.get(14)?,
        text_color: row.get(15)?,
        font_family: row.get(16)?,
        // Unreadable option lists read back as no options.
        options: serde_json::from_str(&options).unwrap_or_default(),
    })
}

fn background_from_row(row: &Row) -> rusqlite::Result<PageBackground> {
    Ok(PageBackground {
        id: row.get(0)?,
        template_id: row.get(1)?,
        page_index: row.get(2)?,
        filename: row.get(3)?,
        original_name: row.get(4)?,
        asset_ref: row.get(5)?,
        file_size: row.get(6)?,
        mime_type: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn hydrate(conn: &Connection, template: &mut Template) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM template_fields WHERE template_id = ?1 ORDER BY id",
        FIELD_COLUMNS
    ))?;
    template.fields = stmt
        .query_map(params![template.id], field_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    template.page_backgrounds = load_backgrounds(conn, &template.id)?;
    Ok(())
}

fn load_backgrounds(conn: &Connection, template_id: &str) -> Result<Vec<PageBackground>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM svg_files WHERE template_id = ?1 ORDER BY created_at, id",
        BACKGROUND_COLUMNS
    ))?;
    let backgrounds = stmt
        .query_map(params![template_id], background_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(backgrounds)
}

fn find_background(
    conn: &Connection,
    template_id: &str,
    page_index: u32,
) -> Result<Option<PageBackground>, StoreError> {
    let background = conn
        .query_row(
            &format!(
                "SELECT {} FROM svg_files WHERE template_id = ?1 AND page_index = ?2",
                BACKGROUND_COLUMNS
            ),
            params![template_id, page_index],
            background_from_row,
        )
        .optional()?;
    Ok(background)
}

fn insert_background(conn: &Connection, background: &PageBackground) -> Result<PageBackground, StoreError> {
    conn.execute(
        "INSERT INTO svg_files
            (template_id, page_index, filename, original_name, gcs_path, file_size, mime_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            background.template_id,
            background.page_index,
            background.filename,
            background.original_name,
            background.asset_ref,
            background.file_size,
            background.mime_type,
            background.created_at,
        ],
    )?;
    Ok(PageBackground {
        id: conn.last_insert_rowid(),
        ..background.clone()
    })
}

fn insert_fields(conn: &Connection, template_id: &str, fields: &[Field]) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "INSERT INTO template_fields
            (template_id, name, field_type, required, data_key, is_address_component, page_index,
             position_top, position_left, position_width, position_height, font_size, font_weight,
             font_style, text_decoration, text_color, font_family, options)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
    )?;
    for field in fields {
        let options = if field.options.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&field.options)?
        };
        stmt.execute(params![
            template_id,
            field.name,
            field.field_type,
            field.required,
            field.data_key,
            field.is_address_component,
            field.page_index,
            field.position.top,
            field.position.left,
            field.position.width,
            field.position.height,
            field.font_size,
            field.font_weight,
            field.font_style,
            field.text_decoration,
            field.text_color,
            field.font_family,
            options,
        ])?;
    }
    Ok(())
}
