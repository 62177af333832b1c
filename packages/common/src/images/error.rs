use thiserror::Error;

/// Errors that can occur during image store operations.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// The requested image was not found.
    #[error("image not found: {0}")]
    NotFound(String),

    /// An I/O error occurred.
    #[error("image store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The provided public id is not a valid image id.
    #[error("invalid image id: {0}")]
    InvalidId(String),

    /// The image exceeds the configured size limit.
    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
