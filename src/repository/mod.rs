//! Post storage - data model, repository contract, and search matching

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub use memory::InMemoryPostRepository;

/// A published gallery entry.
///
/// Posts are immutable: fields are only readable, and persisted posts are
/// only ever produced by [`PostRepository::insert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    id: Uuid,
    #[serde(rename = "name", default)]
    author: String,
    prompt: String,
    #[serde(rename = "photo")]
    image_url: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn new(
        id: Uuid,
        author: String,
        prompt: String,
        image_url: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            prompt,
            image_url,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Storage contract for gallery posts. There is no update or delete.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Validate and persist a new post, assigning its id and timestamp
    async fn insert(&self, author: &str, prompt: &str, image_url: &str) -> Result<Post>;

    /// Free-text search, newest first. Blank queries return every post.
    async fn search(&self, query: &str) -> Result<Vec<Post>>;

    /// Number of stored posts
    async fn len(&self) -> Result<usize>;
}

/// Matching policy used by repositories when answering a non-blank query
pub trait PostMatcher: Send + Sync {
    fn matches(&self, post: &Post, query: &str) -> bool;
}

/// Case-insensitive, non-anchored substring match over author OR prompt.
///
/// The query is taken literally; no pattern syntax is interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl PostMatcher for SubstringMatcher {
    fn matches(&self, post: &Post, query: &str) -> bool {
        let needle = query.to_lowercase();
        post.author.to_lowercase().contains(&needle) || post.prompt.to_lowercase().contains(&needle)
    }
}

/// Check the required fields of a new post and return their trimmed forms
pub(crate) fn validate_new_post<'a>(
    author: &'a str,
    prompt: &'a str,
    image_url: &'a str,
) -> Result<(&'a str, &'a str, &'a str)> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("prompt is required".to_string()));
    }
    let image_url = image_url.trim();
    if image_url.is_empty() {
        return Err(AppError::Validation("photo is required".to_string()));
    }
    Ok((author.trim(), prompt, image_url))
}

/// Blank search text means "match all"; anything else is matched as given,
/// surrounding whitespace included.
pub(crate) fn normalize_query(query: &str) -> Option<&str> {
    if query.trim().is_empty() {
        None
    } else {
        Some(query)
    }
}
