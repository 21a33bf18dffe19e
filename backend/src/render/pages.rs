//! Page grouping for multi-page templates.

use crate::error::RenderError;
use common::model::template::{Field, PageBackground};
use std::collections::{BTreeMap, BTreeSet};

/// Everything drawn on one page: its fields in stored order and its background.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec<'a> {
    pub index: u32,
    pub fields: Vec<&'a Field>,
    pub background: Option<&'a PageBackground>,
}

/// Buckets fields and backgrounds by page index.
///
/// Pages are emitted in ascending order from 0 up to the highest index seen on
/// either side; an index with neither fields nor a background is skipped
/// instead of producing a blank page. Fails with
/// [`RenderError::NoRenderablePages`] when nothing is left.
pub fn group_pages<'a>(
    fields: &'a [Field],
    backgrounds: &'a [PageBackground],
) -> Result<Vec<PageSpec<'a>>, RenderError> {
    let mut fields_by_page: BTreeMap<u32, Vec<&'a Field>> = BTreeMap::new();
    for field in fields {
        fields_by_page.entry(field.page_index).or_default().push(field);
    }

    // Page index is unique per template; should duplicates slip through, the
    // most recently created one wins like it does for lookups.
    let mut background_by_page: BTreeMap<u32, &'a PageBackground> = BTreeMap::new();
    for background in backgrounds {
        let newer = background_by_page
            .get(&background.page_index)
            .map_or(true, |current| {
                (background.created_at, background.id) >= (current.created_at, current.id)
            });
        if newer {
            background_by_page.insert(background.page_index, background);
        }
    }

    let indices: BTreeSet<u32> = fields_by_page
        .keys()
        .chain(background_by_page.keys())
        .copied()
        .collect();

    let pages: Vec<PageSpec<'a>> = indices
        .into_iter()
        .map(|index| PageSpec {
            index,
            fields: fields_by_page.remove(&index).unwrap_or_default(),
            background: background_by_page.get(&index).copied(),
        })
        .collect();

    if pages.is_empty() {
        return Err(RenderError::NoRenderablePages);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn field(key: &str, page: u32) -> Field {
        Field {
            name: key.to_string(),
            field_type: "text".to_string(),
            data_key: key.to_string(),
            page_index: page,
            ..Field::default()
        }
    }

    fn background(id: i64, page: u32) -> PageBackground {
        PageBackground {
            id,
            template_id: "T1".to_string(),
            page_index: page,
            filename: format!("{}.svg", page),
            original_name: format!("{}.svg", page),
            asset_ref: format!("templates/T1/{}.svg", id),
            file_size: 1,
            mime_type: "image/svg+xml".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn keeps_pages_with_only_fields_or_only_background() {
        let fields = vec![field("a", 0), field("b", 2)];
        let backgrounds = vec![background(1, 1), background(2, 2)];

        let pages = group_pages(&fields, &backgrounds).unwrap();
        let indices: Vec<u32> = pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        assert!(pages[0].background.is_none());
        assert_eq!(pages[0].fields.len(), 1);
        assert!(pages[1].fields.is_empty());
        assert_eq!(pages[1].background.map(|b| b.id), Some(1));
        assert_eq!(pages[2].fields[0].data_key, "b");
        assert_eq!(pages[2].background.map(|b| b.id), Some(2));
    }

    #[test]
    fn skips_empty_indices() {
        let fields = vec![field("a", 0), field("z", 4)];
        let pages = group_pages(&fields, &[]).unwrap();
        let indices: Vec<u32> = pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 4]);
    }

    #[test]
    fn field_order_within_page_is_stored_order() {
        let fields = vec![field("zeta", 0), field("alpha", 0), field("zeta", 0)];
        let backgrounds = [background(1, 0)];
        let pages = group_pages(&fields, &backgrounds).unwrap();
        let keys: Vec<&str> = pages[0].fields.iter().map(|f| f.data_key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "zeta"]);
    }

    #[test]
    fn empty_input_has_no_renderable_pages() {
        assert!(matches!(
            group_pages(&[], &[]),
            Err(RenderError::NoRenderablePages)
        ));
    }
}
