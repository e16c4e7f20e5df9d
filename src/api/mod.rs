//! HTTP API - routes and JSON handlers

pub mod handlers;
pub mod routes;

/// Response header telling clients whether a listing came from live storage
pub const GALLERY_MODE_HEADER: &str = "x-gallery-mode";
