use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::ImageStoreError;
use super::id::ImageId;
use super::traits::{ImageStore, StoredImage};

/// Filesystem-backed image store.
///
/// Images are stored in a Git-style sharded directory layout:
/// `{base_path}/{first 2 hex chars}/{remaining 62 hex chars}`
pub struct FilesystemImageStore {
    base_path: PathBuf,
    base_url: String,
    max_size: u64,
}

impl FilesystemImageStore {
    /// Create a new filesystem image store rooted at `base_path`.
    pub async fn new(
        base_path: PathBuf,
        base_url: String,
        max_size: u64,
    ) -> Result<Self, ImageStoreError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    fn image_path(&self, id: &ImageId) -> PathBuf {
        self.base_path
            .join(id.shard_prefix())
            .join(id.shard_suffix())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn upload(&self, data: &[u8]) -> Result<StoredImage, ImageStoreError> {
        if data.len() as u64 > self.max_size {
            return Err(ImageStoreError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let id = ImageId::compute(data);
        let public_id = id.to_hex();
        let image_path = self.image_path(&id);

        if image_path.exists() {
            return Ok(StoredImage {
                url: self.url_for(&public_id),
                public_id,
            });
        }

        // Write to a temp file and rename so a crashed upload never leaves a
        // partial image at its final path.
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = image_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &image_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredImage {
            url: self.url_for(&public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<bool, ImageStoreError> {
        let id = ImageId::from_hex(public_id)?;
        match fs::remove_file(self.image_path(&id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, public_id: &str) -> Result<bool, ImageStoreError> {
        let id = ImageId::from_hex(public_id)?;
        Ok(self.image_path(&id).exists())
    }

    fn url_for(&self, public_id: &str) -> String {
        format!("{}/{}", self.base_url, public_id)
    }
}
