use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// An uploaded file as received from a form submission.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Client-supplied filename, possibly empty.
    pub file_name: String,
    /// Declared MIME type, if the client sent one.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Zero-size uploads are what browsers send for an untouched file input.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// A successfully stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub folder: String,
    pub public_id: String,
    /// Resolvable URL persisted on the owning record.
    pub url: String,
}

/// Folder-namespaced remote asset storage.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store a file under `folder` and return where it can be reached.
    async fn upload(&self, folder: &str, file: &MediaFile) -> Result<StoredAsset, StorageError>;

    /// Retrieve an asset as a streaming async reader.
    async fn get_stream(&self, folder: &str, public_id: &str)
    -> Result<BoxReader, StorageError>;

    /// Retrieve all bytes of an asset.
    async fn get(&self, folder: &str, public_id: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(folder, public_id).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Delete an asset.
    ///
    /// Returns `true` if the asset was deleted, `false` if it did not exist.
    async fn delete(&self, folder: &str, public_id: &str) -> Result<bool, StorageError>;

    /// The public URL an asset stored under `folder/public_id` is served from.
    fn url_for(&self, folder: &str, public_id: &str) -> String;
}
