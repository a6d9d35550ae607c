// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from the environment

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::backend::ocr_space::OCR_SPACE_URL;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
/// 20 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_PADDLE_MODEL_DIR: &str = "./models/paddleocr-onnx";
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.3;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("OCR_SPACE_API_KEY must be set for the hosted OCR backend")]
    MissingApiKey,

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Hosted OCR.space settings
#[derive(Debug, Clone)]
pub struct OcrSpaceConfig {
    pub url: String,
    pub api_key: String,
    pub language: String,
    /// Whole-request timeout; none when unset
    pub timeout_secs: Option<u64>,
}

/// PaddleOCR ONNX model settings
#[derive(Debug, Clone)]
pub struct PaddleConfig {
    /// Directory holding the detection and recognition models plus dictionary
    pub model_dir: PathBuf,
    pub detection_threshold: f32,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for the multipart request body
    pub max_upload_bytes: usize,
    /// Language passed to the local engine
    pub language: String,
    /// Tesseract page segmentation mode
    pub tesseract_psm: Option<i32>,
    pub ocr_space: OcrSpaceConfig,
    pub paddle: PaddleConfig,
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn default_language() -> &'static str {
    if cfg!(feature = "backend-paddle") {
        "en"
    } else {
        "eng"
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// unset or unparsable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let language = lookup("OCR_LANGUAGE").unwrap_or_else(|| default_language().to_string());

        Self {
            host: lookup("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(&lookup, "API_PORT").unwrap_or(DEFAULT_PORT),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            tesseract_psm: parse_var(&lookup, "TESSERACT_PSM"),
            ocr_space: OcrSpaceConfig {
                url: lookup("OCR_SPACE_URL").unwrap_or_else(|| OCR_SPACE_URL.to_string()),
                api_key: lookup("OCR_SPACE_API_KEY").unwrap_or_default(),
                language: language.clone(),
                timeout_secs: parse_var(&lookup, "OCR_REQUEST_TIMEOUT_SECS"),
            },
            paddle: PaddleConfig {
                model_dir: lookup("PADDLE_MODEL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_PADDLE_MODEL_DIR)),
                detection_threshold: parse_var(&lookup, "PADDLE_DET_THRESHOLD")
                    .unwrap_or(DEFAULT_DETECTION_THRESHOLD),
            },
            language,
        }
    }

    /// Validate the configuration for the backend compiled into this build
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_UPLOAD_BYTES",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "OCR_LANGUAGE",
                reason: "must not be empty".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.paddle.detection_threshold) {
            return Err(ConfigError::Invalid {
                name: "PADDLE_DET_THRESHOLD",
                reason: format!("{} is outside [0, 1)", self.paddle.detection_threshold),
            });
        }
        if self.ocr_space.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                name: "OCR_REQUEST_TIMEOUT_SECS",
                reason: "must be greater than 0".to_string(),
            });
        }
        if uses_hosted_backend() && self.ocr_space.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// True when neither local engine feature is enabled
pub fn uses_hosted_backend() -> bool {
    !cfg!(any(feature = "backend-tesseract", feature = "backend-paddle"))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
