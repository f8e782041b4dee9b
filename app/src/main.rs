mod config;
mod logging;
mod services;
mod store;
mod web;

use color_eyre::Result;

use crate::config::AppConfig;
use crate::services::FormHandle;
use crate::store::AppStore;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = AppConfig::from_env()?;

    // Initialize logging
    logging::init(&config.data_dir)?;
    tracing::info!("Starting Signbook");
    tracing::debug!("Configuration: {config:#?}");

    let store = AppStore::open(&config.storage).await?;
    let handle = FormHandle::start(store, config.form).await;
    let app = web::create_app(handle);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Server running on http://{}", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
