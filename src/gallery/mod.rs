//! Gallery service - generate, create and list operations behind the HTTP API

pub mod demo;

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::pipeline::ImagePipeline;
use crate::repository::{Post, PostRepository};
use crate::storage::base64;

/// Result of listing posts.
///
/// `Degraded` is returned when storage is down; it carries placeholder posts
/// and must not be confused with a genuine `Empty` result.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    Found(Vec<Post>),
    Empty,
    Degraded { posts: Vec<Post>, reason: String },
}

impl ListOutcome {
    pub fn from_posts(posts: Vec<Post>) -> Self {
        if posts.is_empty() {
            ListOutcome::Empty
        } else {
            ListOutcome::Found(posts)
        }
    }

    pub fn posts(&self) -> &[Post] {
        match self {
            ListOutcome::Found(posts) | ListOutcome::Degraded { posts, .. } => posts,
            ListOutcome::Empty => &[],
        }
    }

    pub fn into_posts(self) -> Vec<Post> {
        match self {
            ListOutcome::Found(posts) | ListOutcome::Degraded { posts, .. } => posts,
            ListOutcome::Empty => Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ListOutcome::Degraded { .. })
    }
}

/// Composes the image pipeline and the post repository
pub struct GalleryService {
    pipeline: Arc<ImagePipeline>,
    repository: Arc<dyn PostRepository>,
}

impl GalleryService {
    pub fn new(pipeline: Arc<ImagePipeline>, repository: Arc<dyn PostRepository>) -> Self {
        Self {
            pipeline,
            repository,
        }
    }

    /// Generate an image for the prompt and return its stored URL
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::Validation("prompt is required".to_string()));
        }
        self.pipeline.generate_and_publish(prompt).await
    }

    /// Persist a post.
    ///
    /// An inline base64 photo is uploaded first and the stored URL is saved
    /// instead; required fields are checked before anything is uploaded.
    pub async fn create_post(&self, author: &str, prompt: &str, image_url: &str) -> Result<Post> {
        if prompt.trim().is_empty() {
            return Err(AppError::Validation("prompt is required".to_string()));
        }

        let post = if base64::is_image_data_url(image_url) {
            let stored_url = self.pipeline.publish_data_url(image_url).await?;
            self.repository.insert(author, prompt, &stored_url).await?
        } else {
            self.repository.insert(author, prompt, image_url).await?
        };

        info!(post_id = %post.id(), author = %post.author(), "Post created");
        Ok(post)
    }

    /// Search posts, falling back to the demo gallery if storage is down
    pub async fn list_posts(&self, query: &str) -> Result<ListOutcome> {
        match self.repository.search(query).await {
            Ok(posts) => Ok(ListOutcome::from_posts(posts)),
            Err(AppError::RepositoryUnavailable(reason)) => {
                warn!(reason = %reason, "Post repository unavailable, serving demo gallery");
                Ok(ListOutcome::Degraded {
                    posts: demo::demo_gallery(),
                    reason,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Number of stored posts
    pub async fn post_count(&self) -> Result<usize> {
        self.repository.len().await
    }
}
