//! Shared application state.
//!
//! `AppState` is created once in `main.rs` and handed to every worker as
//! `web::Data`. All of its members are cheap to clone and safe to share: the
//! stores open a fresh SQLite connection per call, and the asset store and
//! renderer are behind `Arc`s.

use crate::config::Config;
use crate::render::background::BackgroundCatalog;
use crate::render::rasterize::Rasterizer;
use crate::render::Renderer;
use crate::store::assets::AssetStore;
use crate::store::forms::FormStore;
use crate::store::templates::TemplateStore;
use crate::store::Database;
use actix_web::HttpRequest;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub templates: TemplateStore,
    pub forms: FormStore,
    pub assets: Arc<dyn AssetStore>,
    pub renderer: Renderer,
}

impl AppState {
    /// Wires the stores and the renderer around one database.
    ///
    /// # Arguments
    /// * `config` - Server configuration; its render timeout becomes the render deadline.
    /// * `db` - The opened database shared by the template and form stores.
    /// * `assets` - Where background bytes live.
    /// * `rasterizer` - HTML to PDF engine.
    pub fn new(
        config: Config,
        db: Database,
        assets: Arc<dyn AssetStore>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        let templates = TemplateStore::new(db.clone());
        let catalog: Arc<dyn BackgroundCatalog> = Arc::new(templates.clone());
        let renderer = Renderer::new(
            catalog,
            Arc::clone(&assets),
            rasterizer,
            config.render_timeout(),
        )
        .with_static_dir(config.static_dir.clone());
        Self {
            config: Arc::new(config),
            templates,
            forms: FormStore::new(db),
            assets,
            renderer,
        }
    }

    /// Origin used in absolute file URLs: the configured base URL, else the
    /// scheme and host the request came in on.
    pub fn base_url(&self, req: &HttpRequest) -> String {
        match self.config.base_url.as_deref() {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => {
                let info = req.connection_info();
                format!("{}://{}", info.scheme(), info.host())
            }
        }
    }
}
