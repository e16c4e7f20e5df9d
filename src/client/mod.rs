//! Client side - typed HTTP client and the debounced search coordinator

pub mod coordinator;
pub mod http_client;

use async_trait::async_trait;

use crate::error::Result;
use crate::gallery::{GalleryService, ListOutcome};

pub use coordinator::{CoordinatorConfig, SearchCoordinator, SearchView};
pub use http_client::GalleryClient;

/// Anything that can answer a gallery listing query
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn list_posts(&self, query: &str) -> Result<ListOutcome>;
}

#[async_trait]
impl PostSource for GalleryService {
    async fn list_posts(&self, query: &str) -> Result<ListOutcome> {
        GalleryService::list_posts(self, query).await
    }
}
