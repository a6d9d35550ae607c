// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum::http::StatusCode;
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::backend::UploadedImage;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// Read the `file` field out of a multipart body
///
/// Other fields are skipped. A missing or empty `file` field is a client
/// error.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(ApiError::InvalidRequest("uploaded file is empty".to_string()));
        }

        debug!("Received upload {:?} ({} bytes)", filename, bytes.len());
        return Ok(UploadedImage { bytes, filename });
    }

    Err(ApiError::MissingField(FILE_FIELD.to_string()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::InvalidRequest(err.body_text())
    }
}
