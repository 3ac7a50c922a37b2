//! S3-compatible media store.
//!
//! Objects live at:
//! ```text
//! s3://{bucket}/{folder}/{public_id}
//! ```
//! and are served from `{public_base_url}/{folder}/{public_id}`.

use std::io::Cursor;

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tracing::debug;

use super::error::StorageError;
use super::key::{join_url, new_public_id, validate_segment};
use super::traits::{BoxReader, MediaFile, MediaStore, StoredAsset};
use crate::config::S3Config;

/// Media store backed by an S3-compatible bucket.
///
/// Objects are keyed `{folder}/{public_id}` and published under
/// `{public_base_url}/{folder}/{public_id}`, typically a CDN in front of
/// the bucket.
pub struct S3MediaStore {
    bucket: Box<Bucket>,
    public_base_url: String,
    max_size: u64,
}

impl S3MediaStore {
    pub fn new(
        config: &S3Config,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| StorageError::Config(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_base_url: public_base_url.into(),
            max_size,
        })
    }

    fn object_key(folder: &str, public_id: &str) -> Result<String, StorageError> {
        Ok(format!(
            "{}/{}",
            validate_segment(folder)?,
            validate_segment(public_id)?
        ))
    }
}

fn check_status(status: u16, key: &str) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        other => Err(StorageError::Backend(format!(
            "unexpected status {other} for {key}"
        ))),
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(&self, folder: &str, file: &MediaFile) -> Result<StoredAsset, StorageError> {
        if file.size() > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: file.size(),
                limit: self.max_size,
            });
        }

        let public_id = new_public_id(&file.file_name, file.content_type.as_deref());
        let key = Self::object_key(folder, &public_id)?;
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let response = self
            .bucket
            .put_object_with_content_type(&key, &file.bytes, content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        check_status(response.status_code(), &key)?;

        debug!(key = %key, size = file.size(), "Uploaded object");

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
        let key = Self::object_key(folder, public_id)?;
        let response = self
            .bucket
            .get_object(&key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        check_status(response.status_code(), &key)?;

        Ok(Box::new(Cursor::new(response.bytes().to_vec())))
    }

    async fn delete(&self, folder: &str, public_id: &str) -> Result<bool, StorageError> {
        let key = Self::object_key(folder, public_id)?;
        let response = self
            .bucket
            .delete_object(&key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match check_status(response.status_code(), &key) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn url_for(&self, folder: &str, public_id: &str) -> String {
        join_url(&self.public_base_url, folder, public_id)
    }
}
