use thiserror::Error;

/// Failures of a key-value backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures inside the cache layer. These never leave `CacheManager`;
/// they are logged and turned into a cache miss or a skipped save.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to encode catalog: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode cached catalog: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Unsupported cache format version {0}")]
    UnsupportedVersion(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}
