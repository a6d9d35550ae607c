// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::request::read_upload;
use super::response::AnalyzeResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::backend::{DecodedImage, OcrBackend, UploadedImage};
use crate::structure::shape;
use crate::vision::decode_image_bytes;

/// POST /analyze - Extract structured text from an uploaded image
///
/// # Request
/// - multipart form with the image in field `file`
///
/// # Response
/// - `{"status": "success", "structured": {..}}` on success
/// - `{"status": "error", "message": ..}` with 200 when the image cannot be
///   decoded or the OCR backend fails
///
/// # Errors
/// - 400 Bad Request: malformed multipart body, missing or empty `file`
/// - 413 Payload Too Large: body exceeds the configured upload limit
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        warn!("Rejected analyze request: {}", e.body_text());
        ApiError::InvalidRequest(e.body_text())
    })?;

    let upload = read_upload(multipart).await.map_err(|e| {
        warn!("Analyze upload rejected: {}", e);
        e
    })?;

    Ok(Json(analyze_upload(state.backend.as_ref(), upload).await))
}

/// Decode, recognize and shape one upload
pub async fn analyze_upload(backend: &dyn OcrBackend, upload: UploadedImage) -> AnalyzeResponse {
    let (image, info) = match decode_image_bytes(&upload.bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Failed to decode upload {:?}: {}", upload.filename, e);
            return AnalyzeResponse::error(format!("Invalid image: {}", e));
        }
    };

    debug!(
        "Decoded image: {}x{}, {} bytes",
        info.width, info.height, info.size_bytes
    );

    let decoded = DecodedImage {
        upload,
        image,
        info,
    };

    let start = Instant::now();
    let fragments = match backend.recognize(&decoded).await {
        Ok(fragments) => fragments,
        Err(e) => {
            warn!("OCR via {} failed: {}", backend.name(), e);
            return AnalyzeResponse::error(e.client_message());
        }
    };

    info!(
        "OCR via {} complete: {} fragments, {}ms",
        backend.name(),
        fragments.len(),
        start.elapsed().as_millis()
    );

    AnalyzeResponse::success(shape(fragments, backend.layout()))
}
