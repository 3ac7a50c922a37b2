use std::path::PathBuf;

use serde::Deserialize;

/// Which remote asset store backs product files and images.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// Credentials and addressing for an S3-compatible bucket.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub bucket: String,
    /// Region name. Default: "us-east-1".
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint for MinIO, R2 and friends. Uses AWS when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    /// Use path-style addressing (`endpoint/bucket/key`). Default: false.
    #[serde(default)]
    pub path_style: bool,
}

fn default_s3_region() -> String {
    "us-east-1".into()
}

/// App-level media storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend selector. Default: filesystem.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend. Default: "./data/media".
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Base URL under which stored assets are reachable.
    /// Default: "http://127.0.0.1:3000/media".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Largest accepted upload in bytes. Default: 64 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    #[serde(default)]
    pub s3: Option<S3Config>,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/media")
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:3000/media".into()
}
fn default_max_upload_size() -> u64 {
    64 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            public_base_url: default_public_base_url(),
            max_upload_size: default_max_upload_size(),
            s3: None,
        }
    }
}
