use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::key::{join_url, new_public_id, validate_segment};
use super::traits::{BoxReader, MediaFile, MediaStore, StoredAsset};

/// Filesystem-backed media store.
///
/// Assets live at `{base_path}/{folder}/{public_id}` and are published under
/// `{public_base_url}/{folder}/{public_id}`.
pub struct FilesystemMediaStore {
    base_path: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemMediaStore {
    /// Create a new filesystem media store.
    pub async fn new(
        base_path: PathBuf,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into(),
            max_size,
        })
    }

    fn asset_path(&self, folder: &str, public_id: &str) -> Result<PathBuf, StorageError> {
        Ok(self
            .base_path
            .join(validate_segment(folder)?)
            .join(validate_segment(public_id)?))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn upload(&self, folder: &str, file: &MediaFile) -> Result<StoredAsset, StorageError> {
        if file.size() > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: file.size(),
                limit: self.max_size,
            });
        }

        let public_id = new_public_id(&file.file_name, file.content_type.as_deref());
        let asset_path = self.asset_path(folder, &public_id)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &file.bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = asset_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &asset_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredAsset {
            url: self.url_for(folder, &public_id),
            folder: folder.to_string(),
            public_id,
        })
    }

    async fn get_stream(
        &self,
        folder: &str,
        public_id: &str,
    ) -> Result<BoxReader, StorageError> {
        let path = self.asset_path(folder, public_id)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{folder}/{public_id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, folder: &str, public_id: &str) -> Result<bool, StorageError> {
        let path = self.asset_path(folder, public_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn url_for(&self, folder: &str, public_id: &str) -> String {
        join_url(&self.public_base_url, folder, public_id)
    }
}
