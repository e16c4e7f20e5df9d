//! Request handlers for the gallery endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::api::GALLERY_MODE_HEADER;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// Body of `POST /posts`; field names follow the web client
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub photo: String,
}

#[derive(Debug, Deserialize)]
pub struct ListPostsParams {
    pub search: Option<String>,
}

fn body_error(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>> {
    let Json(request) = body.map_err(body_error)?;
    let image_url = state.gallery.generate_image(&request.prompt).await?;
    Ok(Json(GenerateImageResponse { image_url }))
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<crate::repository::Post>)> {
    let Json(request) = body.map_err(body_error)?;
    let post = state
        .gallery
        .create_post(&request.name, &request.prompt, &request.photo)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<ListPostsParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| AppError::InvalidArgument(e.body_text()))?;
    let query = params.search.unwrap_or_default();

    let outcome = state.gallery.list_posts(&query).await?;
    let mode = if outcome.is_degraded() { "degraded" } else { "live" };
    debug!(query = %query, mode = mode, results = outcome.posts().len(), "Listed posts");

    Ok(([(GALLERY_MODE_HEADER, mode)], Json(outcome.into_posts())).into_response())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.gallery.post_count().await {
        Ok(posts) => Json(json!({ "status": "ok", "posts": posts })),
        Err(e) => Json(json!({ "status": "degraded", "error": e.to_string() })),
    }
}
