use async_trait::async_trait;

use super::error::ImageStoreError;

/// Handle returned by a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredImage {
    /// Public id the owning record persists for later destroy calls.
    pub public_id: String,
    /// URL at which the image can be fetched.
    pub url: String,
}

/// External object store holding artpiece and profile images.
///
/// Destroy is best-effort from the caller's point of view: a failed remote
/// delete is logged and never rolls back the database record it belonged to.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store image bytes and return the handle for them.
    async fn upload(&self, data: &[u8]) -> Result<StoredImage, ImageStoreError>;

    /// Delete an image by its public id.
    ///
    /// Returns `true` if the image was deleted, `false` if it did not exist
    /// (a repeated destroy is not an error).
    async fn destroy(&self, public_id: &str) -> Result<bool, ImageStoreError>;

    /// Check whether an image exists.
    async fn exists(&self, public_id: &str) -> Result<bool, ImageStoreError>;

    /// The URL an image with the given public id is served from.
    fn url_for(&self, public_id: &str) -> String;
}
