//! Router construction

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::api::handlers;
use crate::AppState;

/// Build the application router.
///
/// Stored images are served from the media directory under `/images`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let media_dir = ServeDir::new(&state.settings.media.base_path);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/generate-image", post(handlers::generate_image))
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .nest_service("/images", media_dir)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
