//! # Legacy URL Cleanup
//!
//! Older clients stored a template's single background as an absolute URL,
//! `http(s)://{host}/api/files/svg/{templateId}`, which breaks whenever the API
//! moves host. This module finds those references and rewrites them to the
//! host-relative `/api/files/svg/{templateId}`.
//!
//! ## Workflow
//!
//! 1.  **Scan**: every template with a non-empty legacy reference is classified
//!     by [`classify`].
//! 2.  **Plan**: absolute URLs whose embedded ID is the template's own ID become a
//!     [`Rewrite`]. Mismatched IDs, `templates/...` paths and anything unparsable
//!     are reported and left alone.
//! 3.  **Apply**: unless running dry, each rewrite is written back through
//!     [`TemplateStore::set_svg_background`]. A failed write is logged and skipped.

use crate::render::background::BackgroundRef;
use crate::store::templates::{LegacyBackground, TemplateStore};
use crate::store::StoreError;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static ABSOLUTE_SVG_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^/]+/api/files/svg/([^/?#]+)$").expect("valid absolute svg url pattern")
});

/// What the tool decided for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Absolute URL pointing at this template; rewrite to the relative path.
    Rewrite(Rewrite),
    /// Absolute URL, but the embedded ID names another template.
    ForeignId { template_id: String, found: String },
    /// A `templates/...` legacy path. Still resolvable, left as is.
    LegacyPath { template_id: String },
    /// Already relative, embedded data, or otherwise not an absolute URL.
    Untouched { template_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub template_id: String,
    pub display_name: String,
    pub from: String,
    pub to: String,
}

/// Totals reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub scanned: usize,
    pub planned: usize,
    pub updated: usize,
    pub failed: usize,
}

pub fn classify(entry: &LegacyBackground) -> Verdict {
    let reference = entry.svg_background.trim();
    if let Some(caps) = ABSOLUTE_SVG_URL.captures(reference) {
        let found = &caps[1];
        if found == entry.template_id {
            return Verdict::Rewrite(Rewrite {
                template_id: entry.template_id.clone(),
                display_name: entry.display_name.clone(),
                from: entry.svg_background.clone(),
                to: BackgroundRef::CurrentLegacySingle {
                    template_id: entry.template_id.clone(),
                }
                .to_string(),
            });
        }
        return Verdict::ForeignId {
            template_id: entry.template_id.clone(),
            found: found.to_string(),
        };
    }
    if reference.contains("templates/") {
        Verdict::LegacyPath {
            template_id: entry.template_id.clone(),
        }
    } else {
        Verdict::Untouched {
            template_id: entry.template_id.clone(),
        }
    }
}

/// Scans the store and, unless `dry_run`, applies the planned rewrites.
pub fn run(store: &TemplateStore, dry_run: bool) -> Result<Summary, StoreError> {
    let entries = store.list_svg_backgrounds()?;
    let mut summary = Summary {
        scanned: entries.len(),
        ..Summary::default()
    };

    for entry in &entries {
        match classify(entry) {
            Verdict::Rewrite(rewrite) => {
                summary.planned += 1;
                if dry_run {
                    info!(
                        "Would update {} - {}: {} -> {}",
                        rewrite.template_id, rewrite.display_name, rewrite.from, rewrite.to
                    );
                    continue;
                }
                match store.set_svg_background(&rewrite.template_id, &rewrite.to) {
                    Ok(true) => {
                        summary.updated += 1;
                        info!("Updated template {} - {}", rewrite.template_id, rewrite.display_name);
                    }
                    Ok(false) => {
                        summary.failed += 1;
                        warn!("Template {} disappeared during cleanup", rewrite.template_id);
                    }
                    Err(e) => {
                        summary.failed += 1;
                        warn!("Failed to update template {}: {}", rewrite.template_id, e);
                    }
                }
            }
            Verdict::ForeignId { template_id, found } => {
                warn!("URL of template {} names template {}; skipping", template_id, found)
            }
            Verdict::LegacyPath { template_id } => {
                info!("Skipping templates/ path of template {}: {}", template_id, entry.svg_background)
            }
            Verdict::Untouched { .. } => {}
        }
    }
    Ok(summary)
}
