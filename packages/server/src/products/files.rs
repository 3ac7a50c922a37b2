use common::storage::{
    FILES_FOLDER, IMAGES_FOLDER, MediaFile, MediaStore, StorageError, StoredAsset,
};
use tracing::{instrument, warn};

use crate::entity::product;

/// Per-asset outcome of uploading a new product's file and image.
pub struct ProductFilesUpload {
    pub file: Result<StoredAsset, StorageError>,
    pub image: Result<StoredAsset, StorageError>,
}

impl ProductFilesUpload {
    /// Both assets, or every asset that did make it (for cleanup) plus the
    /// combined error message.
    pub fn into_pair(self) -> Result<(StoredAsset, StoredAsset), (Vec<StoredAsset>, String)> {
        match (self.file, self.image) {
            (Ok(file), Ok(image)) => Ok((file, image)),
            (file, image) => {
                let mut stored = Vec::new();
                let mut messages = Vec::new();
                for (label, result) in [("file", file), ("image", image)] {
                    match result {
                        Ok(asset) => stored.push(asset),
                        Err(e) => messages.push(format!("{label}: {e}")),
                    }
                }
                Err((stored, messages.join("; ")))
            }
        }
    }
}

/// Upload a new product's downloadable file and image.
///
/// Both uploads are issued and awaited before returning, regardless of
/// whether the first one failed.
#[instrument(skip_all, fields(file = %file.file_name, image = %image.file_name))]
pub async fn product_files_upload(
    media: &dyn MediaStore,
    file: &MediaFile,
    image: &MediaFile,
) -> ProductFilesUpload {
    let file = media.upload(FILES_FOLDER, file).await;
    let image = media.upload(IMAGES_FOLDER, image).await;
    ProductFilesUpload { file, image }
}

/// Replacement assets that were stored for an existing product.
#[derive(Debug, Default)]
pub struct ReplacedFiles {
    pub file: Option<StoredAsset>,
    pub image: Option<StoredAsset>,
}

impl ReplacedFiles {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.image.is_none()
    }

    pub fn into_assets(self) -> Vec<StoredAsset> {
        self.file.into_iter().chain(self.image).collect()
    }
}

/// Upload whichever replacement assets were submitted for `existing`.
///
/// A failed upload is logged and leaves that slot empty, so the caller keeps
/// the product's previous reference for it. The previous assets are not
/// touched here; they are released once the new references are persisted.
#[instrument(skip_all, fields(product_id = %existing.id))]
pub async fn update_product_files(
    media: &dyn MediaStore,
    existing: &product::Model,
    file: Option<&MediaFile>,
    image: Option<&MediaFile>,
) -> ReplacedFiles {
    let mut replaced = ReplacedFiles::default();

    if let Some(file) = file {
        match media.upload(FILES_FOLDER, file).await {
            Ok(asset) => replaced.file = Some(asset),
            Err(e) => warn!(error = %e, "Replacement file upload failed"),
        }
    }

    if let Some(image) = image {
        match media.upload(IMAGES_FOLDER, image).await {
            Ok(asset) => replaced.image = Some(asset),
            Err(e) => warn!(error = %e, "Replacement image upload failed"),
        }
    }

    replaced
}
