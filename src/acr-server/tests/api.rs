//! End-to-end tests driving the router in-process.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_eq, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use acr_server::{AppState, ServerConfig, create_router};

fn unconfigured_router() -> axum::Router {
    create_router(AppState::new(ServerConfig::default()))
}

fn router_for(upstream: &MockServer) -> axum::Router {
    let mut config = ServerConfig::default();
    config.upstream.api_url = Some(format!("{}/generate", upstream.uri()));
    config.upstream.api_key = Some("secret".to_string());
    config.upstream.timeout_secs = 5;
    create_router(AppState::new(config))
}

async fn post_json(router: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(unconfigured_router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn review_without_upstream_returns_notice() {
    let (status, body) = post_json(
        unconfigured_router(),
        "/api/review",
        json!({"code": "x=1", "language": "python"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let review = body["review"].as_str().unwrap();
    assert!(review.contains("GROQ not configured"));
}

#[tokio::test]
async fn review_requires_code() {
    let (status, body) = post_json(unconfigured_router(), "/api/review", json!({"code": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "code is required"}));

    let (status, body) = post_json(unconfigured_router(), "/api/review", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "code is required"}));
}

#[tokio::test]
async fn generate_requires_description() {
    let (status, body) = post_json(
        unconfigured_router(),
        "/api/generate",
        json!({"description": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "description is required"}));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/review")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(unconfigured_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let code = "a".repeat(2 * 1024 * 1024 + 1);
    let (status, body) =
        post_json(unconfigured_router(), "/api/review", json!({"code": code})).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"error": "Payload too large"}));
}

#[tokio::test]
async fn generate_forwards_prompt_and_prefers_code_field() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_eq("authorization", "Bearer secret"))
        .and(body_partial_json(json!({"mode": "code-generation"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": "fn main() {}", "text": "ignored"})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let (status, body) = post_json(
        router_for(&upstream),
        "/api/generate",
        json!({"description": "empty program", "language": "rust", "options": {"x": 1}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": "fn main() {}"}));

    let received = upstream.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = sent["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("You are an expert rust developer."));
    assert!(prompt.ends_with("Request:\nempty program"));
}

#[tokio::test]
async fn review_uses_text_then_result() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "LGTM"})))
        .mount(&upstream)
        .await;

    let (status, body) = post_json(
        router_for(&upstream),
        "/api/review",
        json!({"code": "let x = 1;"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"review": "LGTM"}));
}

#[tokio::test]
async fn upstream_error_status_still_answers_ok() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&upstream)
        .await;

    let (status, body) =
        post_json(router_for(&upstream), "/api/review", json!({"code": "x=1"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"review": "GROQ request failed with status 401: invalid api key"})
    );
}

#[tokio::test]
async fn responses_carry_request_id() {
    let request = Request::builder()
        .uri("/api/health")
        .header("X-Request-Id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = unconfigured_router().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("X-Request-Id").unwrap(),
        "req-123"
    );
    assert!(response.headers().contains_key("X-Response-Time"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = unconfigured_router().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
