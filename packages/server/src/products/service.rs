use chrono::Utc;
use common::storage::{FILES_FOLDER, IMAGES_FOLDER, MediaStore, StoredAsset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::files::{ReplacedFiles, product_files_upload, update_product_files};
use crate::assets::{AssetJanitor, REASON_PRODUCT_DELETED, REASON_REPLACED, REASON_UNATTACHED};
use crate::entity::{asset_deletion, product};
use crate::error::AppError;
use crate::models::product::{NewProduct, ProductEdit};
use crate::views::ViewCache;

/// Result of an edit submission.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(product::Model),
    /// No replacement asset was stored, so nothing was written.
    Unchanged,
}

/// Product mutation workflows: validation has already happened, this keeps
/// the stored asset references consistent with what the media store holds.
pub struct ProductService<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaStore,
    views: &'a ViewCache,
}

impl<'a> ProductService<'a> {
    pub fn new(db: &'a DatabaseConnection, media: &'a dyn MediaStore, views: &'a ViewCache) -> Self {
        Self { db, media, views }
    }

    fn janitor(&self) -> AssetJanitor<'a> {
        AssetJanitor::new(self.db, self.media)
    }

    pub async fn find(&self, id: Uuid) -> Result<product::Model, AppError> {
        product::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    /// Every product, by name.
    pub async fn list_all(&self) -> Result<Vec<product::Model>, AppError> {
        Ok(product::Entity::find()
            .order_by_asc(product::Column::Name)
            .all(self.db)
            .await?)
    }

    /// Purchasable products, by name.
    pub async fn list_available(&self) -> Result<Vec<product::Model>, AppError> {
        Ok(product::Entity::find()
            .filter(product::Column::IsAvailableForPurchase.eq(true))
            .order_by_asc(product::Column::Name)
            .all(self.db)
            .await?)
    }

    /// Most recently created purchasable products.
    pub async fn newest_available(&self, limit: u64) -> Result<Vec<product::Model>, AppError> {
        Ok(product::Entity::find()
            .filter(product::Column::IsAvailableForPurchase.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .limit(Some(limit))
            .all(self.db)
            .await?)
    }

    /// Upload both assets, then persist the product unavailable for purchase.
    ///
    /// Nothing is written unless both uploads succeed.
    #[instrument(skip_all, fields(name = %input.name))]
    pub async fn create(&self, input: NewProduct) -> Result<product::Model, AppError> {
        let upload = product_files_upload(self.media, &input.file, &input.image).await;

        let (file, image) = match upload.into_pair() {
            Ok(pair) => pair,
            Err((stored, message)) => {
                error!(error = %message, "Product asset upload failed");
                self.janitor().discard(&stored, REASON_UNATTACHED).await;
                return Err(AppError::UploadFailed(message));
            }
        };

        let now = Utc::now();
        let new_product = product::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            description: Set(input.description),
            price_in_cents: Set(input.price_in_cents),
            file_path: Set(file.url.clone()),
            image_path: Set(image.url.clone()),
            is_available_for_purchase: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = match new_product.insert(self.db).await {
            Ok(model) => model,
            Err(e) => {
                self.janitor()
                    .discard(&[file, image], REASON_UNATTACHED)
                    .await;
                return Err(e.into());
            }
        };

        info!(product_id = %model.id, "Created product");
        self.views.revalidate_storefront();
        Ok(model)
    }

    /// Apply an edit, replacing whichever assets were submitted and stored.
    ///
    /// A slot whose upload failed keeps its previous reference. When no
    /// replacement asset was stored at all, nothing is persisted.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update(&self, id: Uuid, input: ProductEdit) -> Result<UpdateOutcome, AppError> {
        let existing = self.find(id).await?;

        let replaced = update_product_files(
            self.media,
            &existing,
            input.file.as_ref(),
            input.image.as_ref(),
        )
        .await;

        if replaced.is_empty() {
            info!("No replacement assets stored, leaving product unchanged");
            return Ok(UpdateOutcome::Unchanged);
        }

        let (model, superseded) = match self.persist_update(id, input, &replaced).await {
            Ok(persisted) => persisted,
            Err(e) => {
                self.janitor()
                    .discard(&replaced.into_assets(), REASON_UNATTACHED)
                    .await;
                return Err(e);
            }
        };

        let report = self.janitor().process(superseded).await;
        if report.failed > 0 {
            warn!(failed = report.failed, "Some replaced assets are pending deletion");
        }

        self.views.revalidate_storefront();
        Ok(UpdateOutcome::Updated(model))
    }

    /// Write the edit and queue the assets it supersedes.
    ///
    /// The row is re-read under lock inside the transaction, so the queued
    /// assets are the ones referenced at commit time even when another edit
    /// landed while the uploads were in flight.
    async fn persist_update(
        &self,
        id: Uuid,
        input: ProductEdit,
        replaced: &ReplacedFiles,
    ) -> Result<(product::Model, Vec<asset_deletion::Model>), AppError> {
        let txn = self.db.begin().await?;

        let existing = product::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        let old_file = existing.file_path.clone();
        let old_image = existing.image_path.clone();

        let mut active: product::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.price_in_cents = Set(input.price_in_cents);
        active.is_available_for_purchase = Set(false);
        if let Some(file) = &replaced.file {
            active.file_path = Set(file.url.clone());
        }
        if let Some(image) = &replaced.image {
            active.image_path = Set(image.url.clone());
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&txn).await?;

        let mut superseded = Vec::new();
        let released = [
            (replaced.file.as_ref(), FILES_FOLDER, old_file),
            (replaced.image.as_ref(), IMAGES_FOLDER, old_image),
        ];
        for (new_asset, folder, old_url) in released {
            if new_asset.is_some_and(|a: &StoredAsset| a.url != old_url)
                && let Some(entry) =
                    AssetJanitor::enqueue_url(&txn, folder, &old_url, REASON_REPLACED).await?
            {
                superseded.push(entry);
            }
        }

        txn.commit().await?;
        Ok((model, superseded))
    }

    /// Set the availability flag.
    #[instrument(skip_all, fields(product_id = %id, available = available))]
    pub async fn set_availability(
        &self,
        id: Uuid,
        available: bool,
    ) -> Result<product::Model, AppError> {
        let existing = self.find(id).await?;

        let mut active: product::ActiveModel = existing.into();
        active.is_available_for_purchase = Set(available);
        active.updated_at = Set(Utc::now());
        let model = active.update(self.db).await?;

        self.views.revalidate_storefront();
        Ok(model)
    }

    /// Delete a product and release both of its assets.
    ///
    /// The row removal and the queueing of its assets commit together; the
    /// remote deletes run afterwards and anything that fails stays queued
    /// for the sweeper.
    ///
    /// A stored URL that does not end in a public id (one written outside
    /// this service) cannot be addressed in the media store. That asset is
    /// skipped with a warning and fewer than two deletes are issued.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<product::Model, AppError> {
        let txn = self.db.begin().await?;

        let product = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        product::Entity::delete_by_id(id).exec(&txn).await?;

        let mut pending = Vec::with_capacity(2);
        for (folder, url) in [
            (FILES_FOLDER, &product.file_path),
            (IMAGES_FOLDER, &product.image_path),
        ] {
            if let Some(entry) =
                AssetJanitor::enqueue_url(&txn, folder, url, REASON_PRODUCT_DELETED).await?
            {
                pending.push(entry);
            }
        }

        txn.commit().await?;

        let report = self.janitor().process(pending).await;
        if report.failed > 0 {
            warn!(failed = report.failed, "Some product assets are pending deletion");
        }

        info!("Deleted product");
        self.views.revalidate_storefront();
        Ok(product)
    }
}
