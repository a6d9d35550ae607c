// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR backend adapters
//!
//! Exactly one backend serves a deployment; the choice is made at build time
//! through cargo features and resolved once by [`build_backend`].

pub mod ocr_space;
pub mod paddle;
#[cfg(feature = "backend-tesseract")]
pub mod tesseract;
#[cfg(test)]
pub(crate) mod test_support;

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::vision::ImageInfo;

pub use ocr_space::OcrSpaceBackend;

/// One recognized unit of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    /// Polygon corners in image pixels, when the backend reports geometry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<[f32; 2]>>,
    /// Confidence in `[0, 1]`, when the backend reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl TextFragment {
    /// A plain text fragment without geometry
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
            confidence: None,
        }
    }

    pub fn with_geometry(text: impl Into<String>, bbox: Vec<[f32; 2]>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
            confidence: Some(confidence.clamp(0.0, 1.0)),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split a text blob into line fragments, stripping `\r` from CRLF endings
pub fn split_lines(text: &str) -> Vec<TextFragment> {
    text.split('\n')
        .map(|line| TextFragment::text(line.trim_end_matches('\r')))
        .collect()
}

/// How a backend's fragments are shaped into the structured response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Title plus the joined text and its lines
    Lines,
    /// Title plus label/price/button buckets and the raw list
    Categorized,
    /// Title plus raw fragments with geometry and confidence
    Regions,
}

/// An upload as received from the client
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub filename: Option<String>,
}

/// An upload that decoded successfully
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub upload: UploadedImage,
    pub image: DynamicImage,
    pub info: ImageInfo,
}

impl DecodedImage {
    /// Filename to hand to backends that need one
    ///
    /// The extension always follows the detected format, never the name the
    /// client sent.
    pub fn filename(&self) -> String {
        format!(
            "upload.{}",
            crate::vision::format_to_extension(self.info.format)
        )
    }
}

/// Errors raised by an OCR backend
#[derive(Debug, Error)]
pub enum OcrError {
    /// The backend could not be reached
    #[error("OCR backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with a non-success HTTP status
    #[error("OCR backend returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The backend answered with a body we cannot interpret
    #[error("Malformed OCR backend response: {0}")]
    MalformedResponse(String),

    /// The backend processed the request and flagged its own failure
    #[error("{0}")]
    Reported(String),

    /// A local engine failed while recognizing
    #[error("OCR engine failed: {0}")]
    Engine(String),
}

impl OcrError {
    /// Message to return to the client
    pub fn client_message(&self) -> String {
        self.to_string()
    }
}

/// Text recognition capability wrapped by the service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Recognize text in an already decoded upload, in reading order
    async fn recognize(&self, image: &DecodedImage) -> Result<Vec<TextFragment>, OcrError>;

    /// Backend name for logging and health reporting
    fn name(&self) -> &'static str;

    /// Shape of the structured response built from this backend's output
    fn layout(&self) -> Layout;
}

/// Build the backend selected for this build
#[cfg(feature = "backend-paddle")]
pub fn build_backend(config: &ServiceConfig) -> anyhow::Result<std::sync::Arc<dyn OcrBackend>> {
    Ok(std::sync::Arc::new(paddle::PaddleBackend::load(
        &config.paddle,
    )?))
}

/// Build the backend selected for this build
#[cfg(all(feature = "backend-tesseract", not(feature = "backend-paddle")))]
pub fn build_backend(config: &ServiceConfig) -> anyhow::Result<std::sync::Arc<dyn OcrBackend>> {
    Ok(std::sync::Arc::new(tesseract::TesseractBackend::new(
        config.language.clone(),
        config.tesseract_psm,
    )))
}

/// Build the backend selected for this build
#[cfg(not(any(feature = "backend-tesseract", feature = "backend-paddle")))]
pub fn build_backend(config: &ServiceConfig) -> anyhow::Result<std::sync::Arc<dyn OcrBackend>> {
    Ok(std::sync::Arc::new(OcrSpaceBackend::new(&config.ocr_space)?))
}
