//! In-memory post repository with an optional append-only journal

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::repository::{
    normalize_query, validate_new_post, Post, PostMatcher, PostRepository, SubstringMatcher,
};

/// Post repository keeping every post in insertion order.
///
/// When opened with a journal, each insert is appended as one JSON line and
/// flushed before the post becomes visible to searches. A failed append is
/// cut back off the file, so a post the caller never saw is not replayed.
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
    /// Serializes inserts; holds the journal file when one is configured
    writer: Mutex<Option<Journal>>,
    matcher: Arc<dyn PostMatcher>,
}

struct Journal {
    path: PathBuf,
    file: File,
    /// Length of the journal up to the last acknowledged record
    len: u64,
}

impl InMemoryPostRepository {
    /// Create an empty, memory-only repository
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), None)
    }

    /// Open a journal-backed repository, replaying any posts already on disk
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(&path, e))?;
        }

        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(unavailable(&path, e)),
        };

        // Bytes after the last newline belong to a record whose write never completed
        let complete = contents
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        let posts = replay(&path, &contents[..complete])?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| unavailable(&path, e))?;

        let len = complete as u64;
        if complete < contents.len() {
            warn!(
                path = ?path,
                dropped_bytes = contents.len() - complete,
                "Discarding torn record at end of journal"
            );
            file.set_len(len).await.map_err(|e| unavailable(&path, e))?;
        }

        info!(path = ?path, posts = posts.len(), "Opened post journal");

        Ok(Self::from_parts(posts, Some(Journal { path, file, len })))
    }

    /// Replace the matching policy used for non-blank queries
    pub fn with_matcher(mut self, matcher: Arc<dyn PostMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    fn from_parts(posts: Vec<Post>, journal: Option<Journal>) -> Self {
        Self {
            posts: RwLock::new(posts),
            writer: Mutex::new(journal),
            matcher: Arc::new(SubstringMatcher),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Journal {
    async fn append(&mut self, post: &Post) -> Result<()> {
        let mut line = serde_json::to_vec(post)?;
        line.push(b'\n');

        if let Err(e) = self.write_synced(&line).await {
            if let Err(rollback) = self.rollback().await {
                error!(path = ?self.path, error = %rollback, "Failed to cut back journal after a failed append");
            }
            return Err(unavailable(&self.path, e));
        }

        self.len += line.len() as u64;
        Ok(())
    }

    async fn write_synced(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line).await?;
        self.file.sync_data().await
    }

    /// Drop anything written after the last acknowledged record
    async fn rollback(&mut self) -> std::io::Result<()> {
        self.file.set_len(self.len).await?;
        self.file.sync_data().await
    }
}

fn replay(path: &Path, contents: &[u8]) -> Result<Vec<Post>> {
    let contents = std::str::from_utf8(contents).map_err(|e| {
        AppError::RepositoryUnavailable(format!("corrupt journal {}: {}", path.display(), e))
    })?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str::<Post>(line).map_err(|e| {
                AppError::RepositoryUnavailable(format!(
                    "corrupt journal {} at line {}: {}",
                    path.display(),
                    number + 1,
                    e
                ))
            })
        })
        .collect()
}

fn unavailable(path: &Path, e: std::io::Error) -> AppError {
    AppError::RepositoryUnavailable(format!("journal {}: {}", path.display(), e))
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, author: &str, prompt: &str, image_url: &str) -> Result<Post> {
        let (author, prompt, image_url) = validate_new_post(author, prompt, image_url)?;

        let post = Post::new(
            Uuid::new_v4(),
            author.to_string(),
            prompt.to_string(),
            image_url.to_string(),
            Utc::now(),
        );

        let mut writer = self.writer.lock().await;
        if let Some(journal) = writer.as_mut() {
            journal.append(&post).await?;
        }
        self.posts.write().push(post.clone());
        drop(writer);

        debug!(post_id = %post.id(), "Inserted post");
        Ok(post)
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>> {
        let query = normalize_query(query);
        let posts = self.posts.read();

        let results: Vec<Post> = match query {
            None => posts.iter().rev().cloned().collect(),
            Some(q) => posts
                .iter()
                .rev()
                .filter(|post| self.matcher.matches(post, q))
                .cloned()
                .collect(),
        };

        debug!(query = ?query, results = results.len(), "Searched posts");
        Ok(results)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.posts.read().len())
    }
}
