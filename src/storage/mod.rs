//! Media storage - where generated images are published

pub mod base64;
pub mod file;

use async_trait::async_trait;

use crate::error::Result;

pub use file::FileMediaStore;

/// Object storage that turns image bytes into a publicly fetchable URL.
///
/// Uploads are not deduplicated: publishing identical bytes twice may
/// yield two distinct URLs.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store the image and return its public URL
    async fn upload(&self, image: &[u8]) -> Result<String>;
}
