//! Functional tests for the gallery HTTP client

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prompt_gallery::client::GalleryClient;
use prompt_gallery::gallery::ListOutcome;
use prompt_gallery::AppError;

const ANN_ID: &str = "00000000-0000-0000-0000-00000000000a";
const BOB_ID: &str = "00000000-0000-0000-0000-00000000000b";
const DEMO_ID: &str = "00000000-0000-0000-0000-000000000001";

fn post_json(id: &str, name: &str, prompt: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "prompt": prompt,
        "photo": format!("https://media.test/{}.png", name.to_lowercase()),
        "createdAt": "2024-05-01T12:00:00Z"
    })
}

fn client(server: &MockServer) -> GalleryClient {
    GalleryClient::new(server.uri()).unwrap()
}

#[tokio::test]
async fn test_blank_search_omits_query_parameter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-gallery-mode", "live")
                .set_body_json(json!([
                    post_json(BOB_ID, "Bob", "harbor"),
                    post_json(ANN_ID, "Ann", "kite")
                ])),
        )
        .mount(&server)
        .await;

    let outcome = client(&server).list_posts("   ").await.unwrap();

    let posts = match outcome {
        ListOutcome::Found(posts) => posts,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].author(), "Bob");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_search_text_is_sent_as_query_parameter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("search", "red kite"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json(ANN_ID, "Ann", "red kite")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server).list_posts("red kite").await.unwrap();
    assert_eq!(outcome.posts()[0].prompt(), "red kite");
}

#[tokio::test]
async fn test_empty_listing_is_empty_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert_eq!(client(&server).list_posts("").await.unwrap(), ListOutcome::Empty);
}

#[tokio::test]
async fn test_degraded_header_yields_degraded_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-gallery-mode", "degraded")
                .set_body_json(json!([post_json(DEMO_ID, "Demo User", "Abstract digital art")])),
        )
        .mount(&server)
        .await;

    let outcome = client(&server).list_posts("").await.unwrap();

    assert!(outcome.is_degraded());
    assert_eq!(outcome.posts().len(), 1);
}

#[tokio::test]
async fn test_error_envelope_maps_back_to_error_kind() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Validation failed: prompt is required", "type": "invalid_request_error", "code": "validation_failed" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/generate-image"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "error": { "message": "Image generation failed: no capacity", "type": "generation_error", "code": null }
        })))
        .mount(&server)
        .await;

    let client = client(&server);

    match client.create_post("Ann", "", "https://media.test/a.png").await {
        Err(AppError::Validation(message)) => assert!(message.contains("prompt is required")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(matches!(
        client.generate_image("a red kite").await,
        Err(AppError::Generation(_))
    ));
}

#[tokio::test]
async fn test_invalid_argument_code_is_kept_apart_from_validation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Invalid argument: duplicate field `search`", "type": "invalid_request_error", "code": "invalid_argument" }
        })))
        .mount(&server)
        .await;

    match client(&server).list_posts("kite").await {
        Err(AppError::InvalidArgument(message)) => assert!(message.contains("duplicate field")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_image_reads_image_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate-image"))
        .and(body_json(json!({ "prompt": "a red kite" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imageURL": "https://media.test/kite.png"
        })))
        .mount(&server)
        .await;

    let url = client(&server).generate_image("a red kite").await.unwrap();
    assert_eq!(url, "https://media.test/kite.png");
}

#[tokio::test]
async fn test_create_post_sends_client_field_names() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(body_json(json!({
            "name": "Ann",
            "prompt": "red kite",
            "photo": "https://media.test/ann.png"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(post_json(ANN_ID, "Ann", "red kite")))
        .mount(&server)
        .await;

    let post = client(&server)
        .create_post("Ann", "red kite", "https://media.test/ann.png")
        .await
        .unwrap();

    assert_eq!(post.id().to_string(), ANN_ID);
    assert_eq!(post.image_url(), "https://media.test/ann.png");
}
