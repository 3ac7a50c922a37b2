mod error;
mod traits;

pub mod filesystem;
pub mod key;
#[cfg(feature = "object-storage")]
pub mod object;

use std::sync::Arc;

use tracing::info;

pub use error::StorageError;
pub use key::{FILES_FOLDER, IMAGES_FOLDER, extract_filename_from_url, public_id_from_url};
pub use traits::{BoxReader, MediaFile, MediaStore, StoredAsset};

use crate::config::{StorageBackend, StorageConfig};
use filesystem::FilesystemMediaStore;

/// Build the process-wide media store described by `config`.
pub async fn open_media_store(config: &StorageConfig) -> Result<Arc<dyn MediaStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            info!(root = %config.root.display(), "Using filesystem media store");
            let store = FilesystemMediaStore::new(
                config.root.clone(),
                config.public_base_url.clone(),
                config.max_upload_size,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| StorageError::Config("storage.s3 section is required".into()))?;
            info!(
                bucket = %s3.bucket,
                region = %s3.region,
                endpoint = ?s3.endpoint,
                path_style = s3.path_style,
                "Using S3 media store"
            );
            let store = object::S3MediaStore::new(
                s3,
                config.public_base_url.clone(),
                config.max_upload_size,
            )?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Config(
            "built without the object-storage feature".into(),
        )),
    }
}
