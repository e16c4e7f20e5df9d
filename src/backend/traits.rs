//! Common traits and types for image generation backends

use async_trait::async_trait;

use crate::error::Result;

/// Raw image produced by a backend
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Encoded image bytes (PNG, JPEG, ...)
    pub bytes: Vec<u8>,

    /// Revised prompt if the model modified it
    pub revised_prompt: Option<String>,
}

/// Trait for image generation backends
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Generate one image for the prompt. Single attempt, no retries.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;
}
