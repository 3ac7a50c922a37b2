use axum::Json;
use axum::extract::State;
use tracing::{info, instrument};

use crate::assets::AssetJanitor;
use crate::error::{AppError, ErrorBody};
use crate::models::asset::{
    PendingDeletionListResponse, PendingDeletionResponse, SweepReportResponse,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/pending",
    tag = "Assets",
    operation_id = "listPendingAssetDeletions",
    summary = "List assets awaiting removal",
    description = "Assets that are no longer referenced by any product but whose removal from \
        the media store has not succeeded yet, oldest first.",
    responses(
        (status = 200, description = "Pending deletions", body = PendingDeletionListResponse),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<PendingDeletionListResponse>, AppError> {
    let pending = AssetJanitor::new(&state.db, &*state.media).pending().await?;
    let total = pending.len() as u64;
    let data = pending
        .into_iter()
        .map(PendingDeletionResponse::from)
        .collect();

    Ok(Json(PendingDeletionListResponse { data, total }))
}

#[utoipa::path(
    post,
    path = "/sweep",
    tag = "Assets",
    operation_id = "sweepAssets",
    summary = "Retry pending asset removals now",
    description = "Runs one sweeper batch immediately, using the configured batch size and \
        attempt limit.",
    responses(
        (status = 200, description = "Sweep finished", body = SweepReportResponse),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn sweep(State(state): State<AppState>) -> Result<Json<SweepReportResponse>, AppError> {
    let janitor = &state.config.janitor;
    let report = AssetJanitor::new(&state.db, &*state.media)
        .sweep(janitor.batch_size, janitor.max_attempts)
        .await?;

    info!(
        attempted = report.attempted,
        removed = report.removed,
        failed = report.failed,
        "Manual asset sweep finished"
    );

    Ok(Json(SweepReportResponse::from(report)))
}
