use thiserror::Error;

/// Errors that can occur during media storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested asset was not found.
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A folder or public identifier is not a safe flat name.
    #[error("invalid asset key: {0}")]
    InvalidKey(String),

    /// A stored URL could not be mapped back to a public identifier.
    #[error("invalid asset url: {0}")]
    InvalidUrl(String),

    /// The asset exceeds the configured size limit.
    #[error("asset exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    /// The remote store rejected or failed the request.
    #[error("remote store error: {0}")]
    Backend(String),

    #[error("storage misconfigured: {0}")]
    Config(String),
}
