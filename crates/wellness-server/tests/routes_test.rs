//! Integration tests for the wellness HTTP routes

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wellness_server::{create_router, AppState};
use wellness_stream::{ProcessorConfig, StreamProcessor};

const DEADLINE: Duration = Duration::from_secs(5);

struct TestApp {
    router: Router,
    processor: Arc<StreamProcessor>,
    shutdown: CancellationToken,
}

fn test_app() -> TestApp {
    let processor = Arc::new(StreamProcessor::new(ProcessorConfig::default()).unwrap());
    processor.start(CancellationToken::new()).unwrap();

    let shutdown = CancellationToken::new();
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::new(
        processor.clone(),
        handle,
        shutdown.clone(),
        Duration::from_secs(15),
    )
    .unwrap();

    TestApp {
        router: create_router(state, true),
        processor,
        shutdown,
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn wait_for_published(processor: &StreamProcessor, count: u64) {
    timeout(DEADLINE, async {
        while processor.metrics().snapshot().published < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("results were not published in time");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let (status, body) = send(&app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_ping_endpoint() {
    let app = test_app();

    let (status, body) = send(&app.router, get("/api/v1/ping")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");
    let time = body["time"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
}

#[tokio::test]
async fn test_sentiment_endpoint() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post_json("/api/v1/sentiment", r#"{"text": "I really enjoyed this product, it's amazing!"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_eq!(result["sentiment"], "positive");
    assert_eq!(result["text"], "I really enjoyed this product, it's amazing!");
    let score = result["score"].as_f64().unwrap();
    assert!((score - 1.0 / 7.0).abs() < 1e-9);
    assert_eq!(result["confidence"].as_f64().unwrap(), score);
}

#[tokio::test]
async fn test_topics_endpoint() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/v1/topics",
            r#"{"text": "I've been feeling stressed and anxious about work lately"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["topics"], json!(["mental_health"]));
    assert!(body["result"]["confidence"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_invalid_bodies_are_rejected() {
    let app = test_app();
    let expected = json!({ "error": "Invalid request format. 'text' field is required." });

    for uri in ["/api/v1/sentiment", "/api/v1/topics", "/api/v1/stream/submit"] {
        for body in ["{}", r#"{"text": ""}"#, "not json", r#"{"text": 42}"#] {
            let (status, response) = send(&app.router, post_json(uri, body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} with {body}");
            assert_eq!(response, expected);
        }
    }

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/api/v1/sentiment")
        .body(Body::from(r#"{"text": "hello"}"#))
        .unwrap();
    let (status, _) = send(&app.router, no_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_submit_returns_accepted_with_id() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post_json("/api/v1/stream/submit", r#"{"text": "feeling great today"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("item-"));

    let result = timeout(DEADLINE, app.processor.results().recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.item.id, id);
    assert_eq!(result.item.text, "feeling great today");
}

#[tokio::test]
async fn test_submit_after_stop_still_returns_id() {
    let app = test_app();
    app.processor.stop().await;

    let (status, body) = send(
        &app.router,
        post_json("/api/v1/stream/submit", r#"{"text": "anyone there?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["id"].as_str().unwrap().starts_with("item-"));
    assert_eq!(app.processor.metrics().snapshot().rejected, 1);
    assert!(app.processor.results().is_exhausted());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_results_stream_events() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post_json("/api/v1/stream/submit", r#"{"text": "this is awful"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let id = body["id"].as_str().unwrap().to_string();

    wait_for_published(&app.processor, 1).await;
    app.processor.stop().await;

    let response = app
        .router
        .clone()
        .oneshot(get("/api/v1/stream/results"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    // Egress is closed, so the stream ends after draining the buffered result
    let bytes = timeout(DEADLINE, to_bytes(response.into_body(), usize::MAX))
        .await
        .unwrap()
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.starts_with("event: connected\ndata: Stream connection established\n\n"));
    let message = text
        .split("\n\n")
        .find(|frame| frame.starts_with("event: message"))
        .expect("no message event");
    let data = message
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let payload: Value = serde_json::from_str(data).unwrap();

    assert_eq!(payload["id"], id.as_str());
    assert_eq!(payload["text"], "this is awful");
    assert_eq!(payload["sentiment"], "negative");
    assert!((payload["score"].as_f64().unwrap() + 1.0 / 3.0).abs() < 1e-9);
    assert!(payload["timestamp"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_results_stream_ends_on_shutdown() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(get("/api/v1/stream/results"))
        .await
        .unwrap();
    app.shutdown.cancel();

    let bytes = timeout(DEADLINE, to_bytes(response.into_body(), usize::MAX))
        .await
        .unwrap()
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("event: connected"));

    app.processor.stop().await;
}

#[tokio::test]
async fn test_stats_endpoint() {
    let app = test_app();

    let (_, _) = send(
        &app.router,
        post_json("/api/v1/stream/submit", r#"{"text": "hello"}"#),
    )
    .await;
    let (status, body) = send(&app.router, get("/api/v1/stream/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "running");
    assert_eq!(body["workers"], 3);
    assert_eq!(body["ingress_capacity"], 100);
    assert_eq!(body["counters"]["accepted"], 1);

    app.processor.stop().await;
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_set() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(uuid_like(generated.to_str().unwrap()));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-supplied")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "client-supplied");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = test_app();

    let (status, body) = send(&app.router, get("/api/v2/nothing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

fn uuid_like(value: &str) -> bool {
    value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
}
