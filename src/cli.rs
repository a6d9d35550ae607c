// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;

use crate::config::ServiceConfig;

/// OCR analyze node
///
/// Flags override the environment, which `ServiceConfig` reads on its own.
#[derive(Parser, Debug, Default)]
#[command(name = "ocr-analyze-node")]
#[command(version)]
#[command(about = "HTTP service that extracts structured text from screenshots", long_about = None)]
pub struct Cli {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum multipart body size in bytes
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// OCR language code
    #[arg(long)]
    pub language: Option<String>,

    /// Directory holding the PaddleOCR ONNX models
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
}

impl Cli {
    /// Overlay flags that were given on top of `config`
    pub fn apply(self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max_upload_bytes) = self.max_upload_bytes {
            config.max_upload_bytes = max_upload_bytes;
        }
        if let Some(language) = self.language {
            config.ocr_space.language = language.clone();
            config.language = language;
        }
        if let Some(model_dir) = self.model_dir {
            config.paddle.model_dir = model_dir;
        }
        config
    }
}
