// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OCR.space client tests against a local stand-in server
//!
//! The stand-in records the multipart fields it receives and answers with a
//! canned status and body.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::Multipart;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use ocr_analyze_node::{
    backend::{DecodedImage, Layout, OcrBackend, OcrError, OcrSpaceBackend, UploadedImage},
    config::OcrSpaceConfig,
    vision::decode_image_bytes,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

#[derive(Clone)]
struct StandIn {
    status: StatusCode,
    body: Option<Value>,
    seen: Arc<Mutex<HashMap<String, String>>>,
}

async fn parse_image(State(stand_in): State<StandIn>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            format!("{}:{}", filename, len)
        } else {
            field.text().await.unwrap_or_default()
        };
        stand_in.seen.lock().unwrap().insert(name, value);
    }

    match stand_in.body {
        Some(body) => (stand_in.status, Json(body)).into_response(),
        None => (stand_in.status, "<html>not json</html>").into_response(),
    }
}

/// Start a stand-in server, returning its URL and the recorded fields
async fn spawn_stand_in(
    status: StatusCode,
    body: Option<Value>,
) -> (String, Arc<Mutex<HashMap<String, String>>>) {
    let seen = Arc::new(Mutex::new(HashMap::new()));
    let state = StandIn {
        status,
        body,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/parse/image", post(parse_image))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/parse/image", addr), seen)
}

fn backend(url: String) -> OcrSpaceBackend {
    OcrSpaceBackend::new(&OcrSpaceConfig {
        url,
        api_key: "test-key".to_string(),
        language: "eng".to_string(),
        timeout_secs: Some(5),
    })
    .unwrap()
}

fn decoded_png(filename: Option<&str>) -> DecodedImage {
    let bytes = Bytes::from(STANDARD.decode(TINY_PNG_BASE64).unwrap());
    let (image, info) = decode_image_bytes(&bytes).unwrap();
    DecodedImage {
        upload: UploadedImage {
            bytes,
            filename: filename.map(str::to_string),
        },
        image,
        info,
    }
}

#[tokio::test]
async fn test_success_lines_and_request_fields() {
    let (url, seen) = spawn_stand_in(
        StatusCode::OK,
        Some(json!({
            "ParsedResults": [{"ParsedText": "Welcome\r\nLogin\r\n$9.99\r\n", "FileParseExitCode": 1}],
            "OCRExitCode": 1,
            "IsErroredOnProcessing": false
        })),
    )
    .await;

    let fragments = backend(url).recognize(&decoded_png(Some("screen.png"))).await;
    let fragments = assert_ok!(fragments);
    let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["Welcome", "Login", "$9.99", ""]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen["apikey"], "test-key");
    assert_eq!(seen["language"], "eng");
    assert_eq!(seen["scale"], "true");
    assert_eq!(seen["isTable"], "true");
    assert!(seen["file"].starts_with("upload.png:"));
}

#[tokio::test]
async fn test_filename_follows_detected_format_not_client_name() {
    let (url, seen) = spawn_stand_in(
        StatusCode::OK,
        Some(json!({"ParsedResults": [{"ParsedText": ""}], "IsErroredOnProcessing": false})),
    )
    .await;

    let ocr = backend(url);
    assert_ok!(ocr.recognize(&decoded_png(Some("scan.jpg"))).await);
    assert!(seen.lock().unwrap()["file"].starts_with("upload.png:"));
    assert_eq!(ocr.layout(), Layout::Lines);
    assert_eq!(ocr.name(), "ocr.space");
}

#[tokio::test]
async fn test_reported_processing_error_is_verbatim() {
    let (url, _) = spawn_stand_in(
        StatusCode::OK,
        Some(json!({
            "OCRExitCode": 99,
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["Unable to recognize the file type", "E216: Unable to detect the file extension"]
        })),
    )
    .await;

    let err = backend(url).recognize(&decoded_png(None)).await.unwrap_err();
    assert_eq!(
        err.client_message(),
        "Unable to recognize the file type; E216: Unable to detect the file extension"
    );
}

#[tokio::test]
async fn test_non_success_status() {
    let (url, _) = spawn_stand_in(StatusCode::FORBIDDEN, Some(json!({"error": "bad key"}))).await;

    let err = backend(url).recognize(&decoded_png(None)).await.unwrap_err();
    assert!(matches!(err, OcrError::HttpStatus { status: 403, .. }));
    assert_eq!(err.client_message(), "OCR backend returned HTTP 403: Forbidden");
}

#[tokio::test]
async fn test_upstream_error_page_is_not_echoed() {
    // The stand-in answers with an HTML page when no JSON body is given
    let (url, _) = spawn_stand_in(StatusCode::BAD_GATEWAY, None).await;

    let err = backend(url).recognize(&decoded_png(None)).await.unwrap_err();
    let message = err.client_message();
    assert_eq!(message, "OCR backend returned HTTP 502: Bad Gateway");
    assert!(!message.contains("<html>"));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (url, _) = spawn_stand_in(StatusCode::OK, None).await;

    let err = backend(url).recognize(&decoded_png(None)).await.unwrap_err();
    assert!(matches!(err, OcrError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_missing_parsed_results_is_malformed() {
    let (url, _) = spawn_stand_in(StatusCode::OK, Some(json!({"IsErroredOnProcessing": false}))).await;

    let err = backend(url).recognize(&decoded_png(None)).await.unwrap_err();
    assert!(matches!(err, OcrError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend(format!("http://{}/parse/image", addr))
        .recognize(&decoded_png(None))
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Unreachable(_)));
}
