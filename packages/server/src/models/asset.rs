use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assets::SweepReport;
use crate::entity::asset_deletion;

/// A remote asset still waiting to be removed from the media store.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PendingDeletionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "product-images")]
    pub folder: String,
    #[schema(example = "0193a4c2e5f07d1e8b2a9c3d4e5f6a7b.png")]
    pub public_id: String,
    #[schema(example = "product_deleted")]
    pub reason: String,
    /// Failed remote delete attempts so far.
    #[schema(example = 2)]
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl From<asset_deletion::Model> for PendingDeletionResponse {
    fn from(m: asset_deletion::Model) -> Self {
        Self {
            id: m.id,
            folder: m.folder,
            public_id: m.public_id,
            reason: m.reason,
            attempts: m.attempts,
            last_error: m.last_error,
            created_at: m.created_at,
            last_attempt_at: m.last_attempt_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PendingDeletionListResponse {
    pub data: Vec<PendingDeletionResponse>,
    pub total: u64,
}

/// Outcome of a manual sweep.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SweepReportResponse {
    #[schema(example = 3)]
    pub attempted: u64,
    #[schema(example = 2)]
    pub removed: u64,
    #[schema(example = 1)]
    pub failed: u64,
}

impl From<SweepReport> for SweepReportResponse {
    fn from(r: SweepReport) -> Self {
        Self {
            attempted: r.attempted,
            removed: r.removed,
            failed: r.failed,
        }
    }
}
