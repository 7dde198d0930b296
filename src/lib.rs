pub mod access;
pub mod accounts;
pub mod allergies;
pub mod assessments;
pub mod config;
pub mod core_state;
pub mod crypto;
pub mod db;
pub mod error;
pub mod models;
pub mod patients;
pub mod seed;
pub mod session;
pub mod validation;
pub mod web;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),

    #[error("Seeding failed: {0}")]
    Seed(#[from] seed::SeedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the service: logging, configuration, stores, seed data, HTTP.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::Config::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set; using the development default");
    }
    ensure_parent_dir(&config.db_path)?;
    ensure_parent_dir(&config.document_db_path)?;

    let core = core_state::CoreState::open(config)?;
    seed::run_if_needed(&core)?;

    let addr = core.config.bind_addr;
    web::serve(Arc::new(core), addr).await?;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
