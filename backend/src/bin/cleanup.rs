//! Rewrites absolute legacy background URLs to host-relative paths.
//!
//! ```text
//! cleanup --dry-run
//! cleanup --database ./fastfill.sqlite
//! ```

use backend::cleanup;
use backend::config::Config;
use backend::store::templates::TemplateStore;
use backend::store::Database;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Point template backgrounds stored as absolute URLs at `/api/files/svg/{id}`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CleanupArgs {
    /// Show what would be updated without making changes
    #[arg(long)]
    dry_run: bool,

    /// SQLite database to clean; defaults to DATABASE_PATH
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let args = CleanupArgs::parse();
    let path = args.database.unwrap_or_else(|| Config::from_env().database_path);

    let db = match Database::open(&path) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if args.dry_run {
        info!("Running in dry-run mode, no changes will be made");
    }
    match cleanup::run(&TemplateStore::new(db), args.dry_run) {
        Ok(summary) if args.dry_run => {
            info!("Would update {} of {} templates", summary.planned, summary.scanned);
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            info!(
                "Updated {} of {} templates ({} failed)",
                summary.updated, summary.scanned, summary.failed
            );
            if summary.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("Cleanup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
