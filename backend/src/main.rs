use actix_files::Files;
use actix_web::{web, App, HttpServer};
use backend::config::{Config, JSON_LIMIT_BYTES};
use backend::render::rasterize::{ChromeRasterizer, Rasterizer};
use backend::services;
use backend::state::AppState;
use backend::store::assets::{AssetStore, HttpAssetStore, LocalAssetStore};
use backend::store::Database;
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();

    let db = Database::open(&config.database_path).map_err(io::Error::other)?;
    info!("Database ready at {}", db.path().display());

    let assets: Arc<dyn AssetStore> = match config.asset_url.as_deref() {
        Some(url) => {
            info!("Using HTTP asset store at {}", url);
            Arc::new(HttpAssetStore::new(url, config.render_timeout()).map_err(io::Error::other)?)
        }
        None => {
            info!("Using local asset store in {}", config.asset_dir.display());
            Arc::new(LocalAssetStore::new(&config.asset_dir))
        }
    };

    let rasterizer: Arc<dyn Rasterizer> =
        match ChromeRasterizer::discover(config.chrome_path.as_deref(), config.render_timeout()) {
            Ok(chrome) => {
                info!("Rendering PDFs with {}", chrome.binary().display());
                Arc::new(chrome)
            }
            Err(e) => {
                warn!("{}; PDF generation will fail until a browser is installed", e);
                Arc::new(ChromeRasterizer::new("chromium", config.render_timeout()))
            }
        };

    let (host, port) = (config.host.clone(), config.port);
    let static_dir = config.static_dir.clone();
    let state = AppState::new(config, db, assets, rasterizer);

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT_BYTES))
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
            .service(Files::new("/static", &static_dir))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
