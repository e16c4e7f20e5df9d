//! Local filesystem media store

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::{AppError, Result};
use crate::storage::MediaStore;

/// Writes images under a directory and addresses them by a URL prefix.
///
/// The directory is expected to be served at `url_prefix` (the HTTP layer
/// mounts it under `/images`).
pub struct FileMediaStore {
    storage_path: PathBuf,
    url_prefix: String,
}

impl FileMediaStore {
    /// Create a new file store
    pub fn new(storage_path: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            storage_path: storage_path.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.base_path, &config.url_prefix)
    }

    /// Ensure the storage directory exists
    pub async fn ensure_storage_dir(&self) -> Result<()> {
        if !self.storage_path.exists() {
            fs::create_dir_all(&self.storage_path)
                .await
                .map_err(|e| AppError::Storage(format!("cannot create {}: {}", self.storage_path.display(), e)))?;
            debug!(path = ?self.storage_path, "Created storage directory");
        }
        Ok(())
    }

    fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.url_prefix, filename)
    }
}

#[async_trait]
impl MediaStore for FileMediaStore {
    async fn upload(&self, image: &[u8]) -> Result<String> {
        if image.is_empty() {
            return Err(AppError::Storage("refusing to store an empty image".to_string()));
        }
        self.ensure_storage_dir().await?;

        let format = detect_image_format(image).unwrap_or("png");
        let filename = format!("{}.{}", Uuid::new_v4(), format);
        let file_path = self.storage_path.join(&filename);

        fs::write(&file_path, image)
            .await
            .map_err(|e| AppError::Storage(format!("cannot write {}: {}", file_path.display(), e)))?;

        debug!(path = ?file_path, size = image.len(), "Saved image file");

        Ok(self.url_for(&filename))
    }
}

/// Detect image format from binary data using magic bytes
pub(crate) fn detect_image_format(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("gif");
    }

    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("webp");
    }

    None
}
