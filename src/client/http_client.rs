//! HTTP client for the gallery API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::api::handlers::{CreatePostRequest, GenerateImageRequest, GenerateImageResponse};
use crate::api::GALLERY_MODE_HEADER;
use crate::client::PostSource;
use crate::error::{AppError, Result};
use crate::gallery::ListOutcome;
use crate::repository::Post;

/// Error envelope returned by the server
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
    #[serde(default)]
    code: Option<String>,
}

/// Typed client for `/generate-image` and `/posts`
#[derive(Clone)]
pub struct GalleryClient {
    client: Client,
    base_url: String,
}

impl GalleryClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/generate-image"))
            .json(&GenerateImageRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await?;

        let body: GenerateImageResponse = check(response).await?.json().await?;
        Ok(body.image_url)
    }

    pub async fn create_post(&self, name: &str, prompt: &str, photo: &str) -> Result<Post> {
        let response = self
            .client
            .post(self.url("/posts"))
            .json(&CreatePostRequest {
                name: name.to_string(),
                prompt: prompt.to_string(),
                photo: photo.to_string(),
            })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// List posts; the `search` parameter is omitted for blank text
    pub async fn list_posts(&self, search: &str) -> Result<ListOutcome> {
        let mut request = self.client.get(self.url("/posts"));
        if !search.trim().is_empty() {
            request = request.query(&[("search", search)]);
        }

        let response = check(request.send().await?).await?;
        let degraded = response
            .headers()
            .get(GALLERY_MODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|mode| mode.eq_ignore_ascii_case("degraded"))
            .unwrap_or(false);

        let posts: Vec<Post> = response.json().await?;
        debug!(search = %search, results = posts.len(), degraded = degraded, "Fetched posts");

        if degraded {
            Ok(ListOutcome::Degraded {
                posts,
                reason: "server is serving the demo gallery".to_string(),
            })
        } else {
            Ok(ListOutcome::from_posts(posts))
        }
    }
}

#[async_trait]
impl PostSource for GalleryClient {
    async fn list_posts(&self, query: &str) -> Result<ListOutcome> {
        GalleryClient::list_posts(self, query).await
    }
}

/// Turn a non-success response back into the matching error kind
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (message, kind, code) = match serde_json::from_str::<ApiError>(&text) {
        Ok(body) => (body.error.message, body.error.r#type, body.error.code),
        Err(_) => (format!("{}: {}", status, text), String::new(), None),
    };

    Err(match (status, kind.as_str()) {
        (StatusCode::BAD_REQUEST, _) if code.as_deref() == Some("invalid_argument") => {
            AppError::InvalidArgument(message)
        }
        (StatusCode::BAD_REQUEST, _) => AppError::Validation(message),
        (StatusCode::GATEWAY_TIMEOUT, _) => AppError::GenerationTimeout(message),
        (StatusCode::SERVICE_UNAVAILABLE, _) => AppError::RepositoryUnavailable(message),
        (_, "generation_error") => AppError::Generation(message),
        (_, "storage_error") => AppError::Storage(message),
        _ => AppError::Internal(message),
    })
}
