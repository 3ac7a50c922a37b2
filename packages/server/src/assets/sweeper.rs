use std::sync::Arc;
use std::time::Duration;

use common::storage::MediaStore;
use sea_orm::DatabaseConnection;
use tracing::{error, info};

use super::AssetJanitor;
use crate::config::JanitorConfig;

/// Run the pending asset deletion sweeper as a background task.
pub async fn run_asset_sweeper(
    db: DatabaseConnection,
    media: Arc<dyn MediaStore>,
    config: JanitorConfig,
) {
    let scan_interval = Duration::from_secs(config.sweep_interval_secs);

    info!(
        sweep_interval_secs = config.sweep_interval_secs,
        batch_size = config.batch_size,
        max_attempts = config.max_attempts,
        "Starting asset sweeper"
    );

    let mut interval = tokio::time::interval(scan_interval);

    loop {
        interval.tick().await;

        if let Err(e) = sweep_once(&db, &*media, &config).await {
            error!(error = %e, "Asset sweep failed");
        }
    }
}

async fn sweep_once(
    db: &DatabaseConnection,
    media: &dyn MediaStore,
    config: &JanitorConfig,
) -> anyhow::Result<()> {
    let report = AssetJanitor::new(db, media)
        .sweep(config.batch_size, config.max_attempts)
        .await?;

    if report.attempted > 0 {
        info!(
            attempted = report.attempted,
            removed = report.removed,
            failed = report.failed,
            "Swept pending asset deletions"
        );
    }

    Ok(())
}
