// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR.space hosted API backend
//!
//! One multipart POST per request. The API returns a single text blob per
//! page which is split into line fragments.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{split_lines, DecodedImage, Layout, OcrBackend, OcrError, TextFragment};
use crate::config::OcrSpaceConfig;

/// Public OCR.space endpoint
pub const OCR_SPACE_URL: &str = "https://api.ocr.space/parse/image";

const REPORTED_WITHOUT_MESSAGE: &str = "OCR backend reported a processing error";

/// Upstream error bodies are logged up to this many characters and never
/// returned to the client
const LOGGED_BODY_CHARS: usize = 256;

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// OCR.space REST client
pub struct OcrSpaceBackend {
    client: Client,
    url: String,
    api_key: String,
    language: String,
}

impl OcrSpaceBackend {
    pub fn new(config: &OcrSpaceConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    fn form(&self, image: &DecodedImage) -> Form {
        let part = Part::bytes(image.upload.bytes.to_vec()).file_name(image.filename());
        Form::new()
            .part("file", part)
            .text("apikey", self.api_key.clone())
            .text("language", self.language.clone())
            .text("scale", "true")
            .text("isTable", "true")
    }
}

#[async_trait]
impl OcrBackend for OcrSpaceBackend {
    async fn recognize(&self, image: &DecodedImage) -> Result<Vec<TextFragment>, OcrError> {
        debug!(
            "Sending {} bytes to OCR.space (language={})",
            image.info.size_bytes, self.language
        );

        let response = self
            .client
            .post(&self.url)
            .multipart(self.form(image))
            .send()
            .await
            .map_err(|e| {
                warn!("OCR.space request failed: {}", e);
                OcrError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "OCR.space returned HTTP {}: {}",
                status.as_u16(),
                truncate(&body, LOGGED_BODY_CHARS)
            );
            return Err(OcrError::HttpStatus {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        let body: OcrSpaceResponse = response
            .json()
            .await
            .map_err(|e| OcrError::MalformedResponse(format!("JSON parse error: {}", e)))?;

        fragments_from_response(body)
    }

    fn name(&self) -> &'static str {
        "ocr.space"
    }

    fn layout(&self) -> Layout {
        Layout::Lines
    }
}

/// `ErrorMessage` is a string or a list of strings depending on the failure
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_message(self) -> String {
        match self {
            ErrorMessage::One(message) => message,
            ErrorMessage::Many(messages) => messages.join("; "),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<ErrorMessage>,
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

fn fragments_from_response(body: OcrSpaceResponse) -> Result<Vec<TextFragment>, OcrError> {
    if body.is_errored_on_processing {
        let message = body
            .error_message
            .map(ErrorMessage::into_message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| REPORTED_WITHOUT_MESSAGE.to_string());
        return Err(OcrError::Reported(message));
    }

    let pages = body
        .parsed_results
        .filter(|pages| !pages.is_empty())
        .ok_or_else(|| OcrError::MalformedResponse("missing ParsedResults".to_string()))?;

    Ok(pages
        .iter()
        .flat_map(|page| split_lines(&page.parsed_text))
        .collect())
}
