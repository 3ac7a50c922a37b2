use chrono::Utc;
use common::storage::{MediaStore, StoredAsset, public_id_from_url};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{info, warn};

use crate::entity::asset_deletion;

/// The owning product row was deleted.
pub const REASON_PRODUCT_DELETED: &str = "product_deleted";
/// A newer upload replaced the asset on its product.
pub const REASON_REPLACED: &str = "replaced";
/// The asset was uploaded but never attached to a product.
pub const REASON_UNATTACHED: &str = "unattached_upload";

/// Counts from processing a batch of pending deletions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub attempted: u64,
    pub removed: u64,
    pub failed: u64,
}

/// Removes unreferenced assets from the media store.
///
/// Deletions are queued in `asset_deletion` first and only dequeued after
/// the remote delete succeeds.
pub struct AssetJanitor<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaStore,
}

impl<'a> AssetJanitor<'a> {
    pub fn new(db: &'a DatabaseConnection, media: &'a dyn MediaStore) -> Self {
        Self { db, media }
    }

    /// Queue an asset for deletion on `conn`, which may be a transaction.
    pub async fn enqueue<C: ConnectionTrait>(
        conn: &C,
        folder: &str,
        public_id: &str,
        reason: &str,
    ) -> Result<asset_deletion::Model, DbErr> {
        asset_deletion::ActiveModel {
            folder: Set(folder.to_string()),
            public_id: Set(public_id.to_string()),
            reason: Set(reason.to_string()),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(Utc::now()),
            last_attempt_at: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    /// Queue the asset a stored URL points at.
    ///
    /// Returns `None` when no public identifier can be derived from the URL;
    /// such an asset cannot be addressed for deletion.
    pub async fn enqueue_url<C: ConnectionTrait>(
        conn: &C,
        folder: &str,
        url: &str,
        reason: &str,
    ) -> Result<Option<asset_deletion::Model>, DbErr> {
        match public_id_from_url(url) {
            Ok(public_id) => Ok(Some(Self::enqueue(conn, folder, &public_id, reason).await?)),
            Err(e) => {
                warn!(folder, url, error = %e, "Cannot derive public id, skipping asset deletion");
                Ok(None)
            }
        }
    }

    /// Queue and immediately try to remove assets that were uploaded but
    /// will not be referenced.
    pub async fn discard(&self, assets: &[StoredAsset], reason: &str) -> SweepReport {
        let mut entries = Vec::with_capacity(assets.len());
        for asset in assets {
            match Self::enqueue(self.db, &asset.folder, &asset.public_id, reason).await {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    folder = %asset.folder,
                    public_id = %asset.public_id,
                    error = %e,
                    "Failed to queue asset deletion"
                ),
            }
        }
        self.process(entries).await
    }

    /// Issue the remote delete for each entry, dequeuing the ones that succeed.
    pub async fn process(&self, entries: Vec<asset_deletion::Model>) -> SweepReport {
        let mut report = SweepReport::default();
        for entry in entries {
            report.attempted += 1;
            match self.process_one(entry).await {
                Ok(true) => report.removed += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(error = %e, "Failed to record asset deletion outcome");
                }
            }
        }
        report
    }

    /// Returns `Ok(true)` when the asset is gone and the entry was dequeued.
    async fn process_one(&self, entry: asset_deletion::Model) -> Result<bool, DbErr> {
        match self.media.delete(&entry.folder, &entry.public_id).await {
            Ok(existed) => {
                if !existed {
                    info!(
                        folder = %entry.folder,
                        public_id = %entry.public_id,
                        "Asset already absent from store"
                    );
                }
                asset_deletion::Entity::delete_by_id(entry.id)
                    .exec(self.db)
                    .await?;
                Ok(true)
            }
            Err(e) => {
                let attempts = entry.attempts + 1;
                warn!(
                    folder = %entry.folder,
                    public_id = %entry.public_id,
                    attempts,
                    error = %e,
                    "Remote asset deletion failed"
                );
                let mut active: asset_deletion::ActiveModel = entry.into();
                active.attempts = Set(attempts);
                active.last_error = Set(Some(e.to_string()));
                active.last_attempt_at = Set(Some(Utc::now()));
                active.update(self.db).await?;
                Ok(false)
            }
        }
    }

    /// Entries still waiting for a successful remote delete, oldest first.
    pub async fn pending(&self) -> Result<Vec<asset_deletion::Model>, DbErr> {
        asset_deletion::Entity::find()
            .order_by_asc(asset_deletion::Column::Id)
            .all(self.db)
            .await
    }

    /// Retry up to `batch_size` pending entries that have not exhausted
    /// `max_attempts`.
    pub async fn sweep(&self, batch_size: u64, max_attempts: i32) -> Result<SweepReport, DbErr> {
        let entries = asset_deletion::Entity::find()
            .filter(asset_deletion::Column::Attempts.lt(max_attempts))
            .order_by_asc(asset_deletion::Column::Id)
            .limit(Some(batch_size))
            .all(self.db)
            .await?;

        Ok(self.process(entries).await)
    }
}
