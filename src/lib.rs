//! Prompt Gallery
//!
//! Generates images from text prompts, publishes them to media storage, and
//! keeps a searchable community gallery of the results. The `client` module
//! holds the typed HTTP client and the debounced search coordinator used by
//! front ends.

pub mod api;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod gallery;
pub mod pipeline;
pub mod repository;
pub mod storage;

pub use error::{AppError, Result};

use std::sync::Arc;

use gallery::GalleryService;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub gallery: Arc<GalleryService>,
}
