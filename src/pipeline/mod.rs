//! Image pipeline - generation backend to media store

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::backend::GenerationBackend;
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::storage::{base64, MediaStore};

/// Timeouts applied around the external collaborators
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub generation_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Settings> for PipelineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            generation_timeout: settings.generation.timeout(),
            upload_timeout: settings.media.timeout(),
        }
    }
}

/// Turns prompts into stored, URL-addressable images
pub struct ImagePipeline {
    backend: Arc<dyn GenerationBackend>,
    store: Arc<dyn MediaStore>,
    config: PipelineConfig,
}

impl ImagePipeline {
    pub fn new(backend: Arc<dyn GenerationBackend>, store: Arc<dyn MediaStore>) -> Self {
        Self::with_config(backend, store, PipelineConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn MediaStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            backend,
            store,
            config,
        }
    }

    /// Ask the backend for an image. One attempt; the caller decides on retries.
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let started = std::time::Instant::now();

        let image = match tokio::time::timeout(self.config.generation_timeout, self.backend.generate(prompt)).await {
            Ok(Ok(image)) => image,
            Ok(Err(e)) if e.is_generation() => return Err(e),
            Ok(Err(e)) => return Err(AppError::Generation(e.to_string())),
            Err(_) => {
                return Err(AppError::GenerationTimeout(format!(
                    "{} exceeded {:?}",
                    self.backend.name(),
                    self.config.generation_timeout
                )))
            }
        };

        if image.bytes.is_empty() {
            return Err(AppError::Generation(format!(
                "{} returned an empty image",
                self.backend.name()
            )));
        }

        debug!(
            backend = %self.backend.name(),
            size = image.bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            revised_prompt = ?image.revised_prompt,
            "Image generated"
        );

        Ok(image.bytes)
    }

    /// Upload image bytes and return their public URL. Not idempotent.
    pub async fn publish(&self, image: &[u8]) -> Result<String> {
        match tokio::time::timeout(self.config.upload_timeout, self.store.upload(image)).await {
            Ok(Ok(url)) => {
                debug!(url = %url, size = image.len(), "Image published");
                Ok(url)
            }
            Ok(Err(AppError::Storage(message))) => Err(AppError::Storage(message)),
            Ok(Err(e)) => Err(AppError::Storage(e.to_string())),
            Err(_) => Err(AppError::Storage(format!(
                "upload exceeded {:?}",
                self.config.upload_timeout
            ))),
        }
    }

    /// Generate then publish. Nothing is uploaded unless generation succeeded.
    pub async fn generate_and_publish(&self, prompt: &str) -> Result<String> {
        let image = self.generate(prompt).await?;
        let url = self.publish(&image).await?;
        info!(backend = %self.backend.name(), url = %url, "Generated image published");
        Ok(url)
    }

    /// Publish an inline `data:image/...;base64,` payload submitted by a client
    pub async fn publish_data_url(&self, data_url: &str) -> Result<String> {
        let image = base64::decode(data_url)?;
        if image.is_empty() {
            return Err(AppError::Validation("photo payload is empty".to_string()));
        }
        debug!(
            format = ?base64::get_format_from_data_url(data_url),
            size = image.len(),
            "Publishing inline image"
        );
        self.publish(&image).await
    }
}
