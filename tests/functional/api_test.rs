//! Functional tests for the HTTP API

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use prompt_gallery::api::{routes::create_router, GALLERY_MODE_HEADER};
use prompt_gallery::backend::{GeneratedImage, GenerationBackend};
use prompt_gallery::config::Settings;
use prompt_gallery::gallery::GalleryService;
use prompt_gallery::pipeline::ImagePipeline;
use prompt_gallery::repository::{InMemoryPostRepository, Post, PostRepository};
use prompt_gallery::storage::FileMediaStore;
use prompt_gallery::{AppError, AppState, Result};

const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

struct StubBackend {
    fail: bool,
}

#[async_trait]
impl GenerationBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, _prompt: &str) -> Result<GeneratedImage> {
        if self.fail {
            return Err(AppError::Generation("upstream 500".to_string()));
        }
        Ok(GeneratedImage {
            bytes: PNG.to_vec(),
            revised_prompt: None,
        })
    }
}

struct DownRepository;

#[async_trait]
impl PostRepository for DownRepository {
    async fn insert(&self, _author: &str, _prompt: &str, _image_url: &str) -> Result<Post> {
        Err(AppError::RepositoryUnavailable("mongo down".to_string()))
    }

    async fn search(&self, _query: &str) -> Result<Vec<Post>> {
        Err(AppError::RepositoryUnavailable("mongo down".to_string()))
    }

    async fn len(&self) -> Result<usize> {
        Err(AppError::RepositoryUnavailable("mongo down".to_string()))
    }
}

struct TestApp {
    router: Router,
    _media: TempDir,
}

fn test_app(backend_fails: bool, repository: Arc<dyn PostRepository>) -> TestApp {
    let media = tempfile::tempdir().unwrap();

    let mut settings = Settings::default();
    settings.media.base_path = media.path().to_string_lossy().to_string();

    let store = Arc::new(FileMediaStore::new(media.path(), "http://localhost:8080/images"));
    let pipeline = Arc::new(ImagePipeline::new(
        Arc::new(StubBackend { fail: backend_fails }),
        store,
    ));

    let state = Arc::new(AppState {
        settings: Arc::new(settings),
        gallery: Arc::new(GalleryService::new(pipeline, repository)),
    });

    TestApp {
        router: create_router(state),
        _media: media,
    }
}

fn app() -> TestApp {
    test_app(false, Arc::new(InMemoryPostRepository::new()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_post_returns_created() {
    let app = app();

    let response = app
        .router
        .oneshot(post_json(
            "/posts",
            json!({"name": "Ann", "prompt": "a paper crane", "photo": "https://cdn.test/crane.png"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["prompt"], "a paper crane");
    assert_eq!(body["photo"], "https://cdn.test/crane.png");
    assert!(body["_id"].is_string());
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_post_with_blank_prompt_is_bad_request() {
    let app = app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/posts",
            json!({"name": "Ann", "prompt": "  ", "photo": "https://cdn.test/crane.png"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], "validation_failed");

    let listing = app.router.oneshot(get("/posts")).await.unwrap();
    assert_eq!(body_json(listing).await, json!([]));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_posts_newest_first_and_search() {
    let app = app();

    for (name, prompt) in [("Ann", "Kite over dunes"), ("Bob", "harbor at dawn"), ("Kit", "snowy owl")] {
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/posts",
                json!({"name": name, "prompt": prompt, "photo": "https://cdn.test/x.png"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.router.clone().oneshot(get("/posts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[GALLERY_MODE_HEADER], "live");
    let all = body_json(response).await;
    let names: Vec<&str> = all.as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Kit", "Bob", "Ann"]);

    // Author "Kit" and prompt "Kite" both match
    let response = app.router.clone().oneshot(get("/posts?search=KIT")).await.unwrap();
    let hits = body_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 2);

    let response = app.router.oneshot(get("/posts?search=")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_undecodable_search_parameter_is_invalid_argument() {
    let app = app();

    let response = app.router.oneshot(get("/posts?search=a&search=b")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "invalid_argument");
}

#[tokio::test]
async fn test_list_posts_degraded_when_repository_down() {
    let app = test_app(false, Arc::new(DownRepository));

    let response = app.router.oneshot(get("/posts?search=anything")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[GALLERY_MODE_HEADER], "degraded");
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 6);
    assert_eq!(body[0]["name"], "Demo User");
}

#[tokio::test]
async fn test_create_post_surfaces_unavailable_repository() {
    let app = test_app(false, Arc::new(DownRepository));

    let response = app
        .router
        .oneshot(post_json(
            "/posts",
            json!({"name": "Ann", "prompt": "crane", "photo": "https://cdn.test/c.png"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_generate_image_stores_and_serves_file() {
    let app = app();

    let response = app
        .router
        .clone()
        .oneshot(post_json("/generate-image", json!({"prompt": "a glass whale"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let url = body["imageURL"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8080/images/"));

    let path = url.trim_start_matches("http://localhost:8080");
    let image = app.router.oneshot(get(path)).await.unwrap();
    assert_eq!(image.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(image.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), PNG.as_slice());
}

#[tokio::test]
async fn test_generate_image_validation_and_upstream_errors() {
    let app = app();
    let response = app
        .router
        .oneshot(post_json("/generate-image", json!({"prompt": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let failing = test_app(true, Arc::new(InMemoryPostRepository::new()));
    let response = failing
        .router
        .oneshot(post_json("/generate-image", json!({"prompt": "a glass whale"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"]["type"], "generation_error");
}

#[tokio::test]
async fn test_health_reports_post_count() {
    let app = app();
    let response = app.router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok", "posts": 0}));
}
