use std::sync::Arc;

use common::storage::open_media_store;
use server::assets::run_asset_sweeper;
use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;
use server::views::ViewCache;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database).await?;
    info!("Database schema synced");

    let media = open_media_store(&config.storage).await?;

    if config.janitor.enabled {
        tokio::spawn(run_asset_sweeper(
            db.clone(),
            Arc::clone(&media),
            config.janitor.clone(),
        ));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        media,
        views: Arc::new(ViewCache::new()),
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
