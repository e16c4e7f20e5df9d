//! HTTP backend client for OpenAI-compatible image generation APIs

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::traits::{GeneratedImage, GenerationBackend};
use crate::config::GenerationConfig;
use crate::error::{AppError, Result};
use crate::storage::base64;

const GENERATIONS_PATH: &str = "/v1/images/generations";

/// HTTP-based image generation backend
pub struct HttpBackend {
    name: String,
    client: Client,
    endpoint: String,
    api_key: String,
    model: Option<String>,
    size: String,
}

#[derive(Debug, Serialize)]
struct ApiGenerateRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    response_format: &'a str,
}

/// Generic API response from HTTP backends
#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    #[serde(default)]
    images: Vec<ApiImageData>,
    #[serde(default)]
    data: Vec<ApiImageData>,
}

#[derive(Debug, Deserialize)]
struct ApiImageData {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    base64: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

impl HttpBackend {
    /// Create a new HTTP backend from configuration
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let name = reqwest::Url::parse(&endpoint)
            .ok()
            .and_then(|url| url.host_str().map(String::from))
            .unwrap_or_else(|| endpoint.clone());

        Ok(Self {
            name,
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            size: config.size.clone(),
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::GenerationTimeout(format!("{} did not respond in time", self.name))
        } else {
            AppError::Generation(format!("request to {} failed: {}", self.name, e))
        }
    }

    /// Download an image the backend only returned by reference
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(AppError::Generation(format!(
                "fetching generated image returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let url = format!("{}{}", self.endpoint, GENERATIONS_PATH);
        debug!(backend = %self.name, url = %url, "Sending generate request");

        let request = ApiGenerateRequest {
            prompt,
            n: 1,
            size: &self.size,
            model: self.model.as_deref(),
            response_format: "b64_json",
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(backend = %self.name, status = %status, "Generation request rejected");
            return Err(AppError::Generation(format!(
                "Backend returned {}: {}",
                status, body
            )));
        }

        let api_response = response
            .json::<ApiGenerateResponse>()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse response: {}", e)))?;

        // Combine images from both possible response formats
        let image = api_response
            .images
            .into_iter()
            .chain(api_response.data)
            .next()
            .ok_or_else(|| AppError::Generation("backend returned no images".to_string()))?;

        let bytes = match (image.b64_json.or(image.base64), image.url) {
            (Some(b64), _) => base64::decode(&b64)
                .map_err(|e| AppError::Generation(format!("undecodable image payload: {}", e)))?,
            (None, Some(url)) => self.fetch_image(&url).await?,
            (None, None) => {
                return Err(AppError::Generation(
                    "backend image carried neither data nor url".to_string(),
                ))
            }
        };

        debug!(backend = %self.name, size = bytes.len(), "Received generated image");

        Ok(GeneratedImage {
            bytes,
            revised_prompt: image.revised_prompt,
        })
    }
}
