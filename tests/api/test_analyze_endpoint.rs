// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Router-level tests for POST /analyze and GET /health
//!
//! Requests go through the full axum stack with `oneshot`, so multipart
//! extraction, body limits, CORS and response shapes are all exercised.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ocr_analyze_node::{
    api::{create_router, AppState},
    backend::{DecodedImage, Layout, OcrBackend, OcrError, TextFragment},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "analyze-test-boundary";

// 1x1 red PNG
const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

const UPLOAD_LIMIT: usize = 64 * 1024;

/// Backend returning canned lines or a reported error
struct FakeBackend {
    result: Result<Vec<&'static str>, &'static str>,
    layout: Layout,
}

#[async_trait]
impl OcrBackend for FakeBackend {
    async fn recognize(&self, _image: &DecodedImage) -> Result<Vec<TextFragment>, OcrError> {
        match &self.result {
            Ok(lines) => Ok(lines.iter().map(|l| TextFragment::text(*l)).collect()),
            Err(message) => Err(OcrError::Reported(message.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }

    fn layout(&self) -> Layout {
        self.layout
    }
}

fn app(result: Result<Vec<&'static str>, &'static str>, layout: Layout) -> Router {
    let backend = Arc::new(FakeBackend { result, layout });
    create_router(AppState::new(backend), UPLOAD_LIMIT)
}

fn screenshot_app() -> Router {
    app(
        Ok(vec!["Welcome", "", "Login", "$9.99", "Enter your details here"]),
        Layout::Categorized,
    )
}

fn tiny_png() -> Vec<u8> {
    STANDARD.decode(TINY_PNG_BASE64).unwrap()
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_analyze_returns_categorized_structure() {
    let request = analyze_request(multipart_body("file", "screen.png", &tiny_png()));
    let (status, body) = send(screenshot_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "success",
            "structured": {
                "title": "Welcome",
                "labels": ["Welcome"],
                "prices": ["$9.99"],
                "buttons": ["Login"],
                "raw": ["Welcome", "Login", "$9.99", "Enter your details here"]
            }
        })
    );
}

#[tokio::test]
async fn test_analyze_lines_layout() {
    let app = app(Ok(vec!["Invoice", "Total $12.00", ""]), Layout::Lines);
    let request = analyze_request(multipart_body("file", "invoice.png", &tiny_png()));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["structured"],
        json!({
            "title": "Invoice",
            "text": "Invoice\nTotal $12.00",
            "lines": ["Invoice", "Total $12.00"]
        })
    );
}

#[tokio::test]
async fn test_non_image_upload_is_error_with_200() {
    let request = analyze_request(multipart_body("file", "notes.txt", b"plain text, not pixels"));
    let (status, body) = send(screenshot_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid image"));
    assert!(body.get("structured").is_none());
}

#[tokio::test]
async fn test_backend_error_is_passed_through_with_200() {
    let app = app(Err("You may only perform this action upto maximum 10 number of times"), Layout::Lines);
    let request = analyze_request(multipart_body("file", "screen.png", &tiny_png()));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "error",
            "message": "You may only perform this action upto maximum 10 number of times"
        })
    );
}

#[tokio::test]
async fn test_missing_file_field_is_bad_request() {
    let request = analyze_request(multipart_body("image", "screen.png", &tiny_png()));
    let (status, body) = send(screenshot_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Missing multipart field 'file'");
}

#[tokio::test]
async fn test_empty_file_is_bad_request() {
    let request = analyze_request(multipart_body("file", "empty.png", b""));
    let (status, body) = send(screenshot_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file": "abc"}"#))
        .unwrap();
    let (status, body) = send(screenshot_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let request = analyze_request(multipart_body("file", "huge.png", &vec![0u8; UPLOAD_LIMIT * 2]));
    let (status, body) = send(screenshot_app(), request).await;

    assert!(status.is_client_error(), "unexpected status {}", status);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_health_reports_backend_and_version() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(screenshot_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "backend": "fake", "version": env!("CARGO_PKG_VERSION")})
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = screenshot_app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_analyze_rejects_get() {
    let request = Request::builder()
        .uri("/analyze")
        .body(Body::empty())
        .unwrap();
    let response = screenshot_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
