// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local Tesseract engine backend
//!
//! The decoded upload is written to a temporary PNG and handed to the
//! `tesseract` binary on the blocking pool. Output lines are categorized.

use async_trait::async_trait;
use image::ImageFormat;
use rusty_tesseract::{Args, Image};
use tracing::debug;

use super::{split_lines, DecodedImage, Layout, OcrBackend, OcrError, TextFragment};

pub struct TesseractBackend {
    args: Args,
}

impl TesseractBackend {
    /// `language` is a tesseract language code such as `eng`
    pub fn new(language: String, psm: Option<i32>) -> Self {
        let mut args = Args {
            lang: language,
            ..Args::default()
        };
        if psm.is_some() {
            args.psm = psm;
        }
        Self { args }
    }

    fn run(args: &Args, image: &image::DynamicImage) -> Result<String, OcrError> {
        let file = tempfile::Builder::new()
            .prefix("ocr-upload-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Engine(format!("Failed to create temp file: {}", e)))?;

        image
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| OcrError::Engine(format!("Failed to write temp image: {}", e)))?;

        let input = Image::from_path(file.path())
            .map_err(|e| OcrError::Engine(format!("{:?}", e)))?;
        rusty_tesseract::image_to_string(&input, args)
            .map_err(|e| OcrError::Engine(format!("Failed to OCR image: {:?}", e)))
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    async fn recognize(&self, image: &DecodedImage) -> Result<Vec<TextFragment>, OcrError> {
        let args = self.args.clone();
        let raster = image.image.clone();

        let text = tokio::task::spawn_blocking(move || Self::run(&args, &raster))
            .await
            .map_err(|e| OcrError::Engine(format!("OCR task failed: {}", e)))??;

        debug!("Tesseract returned {} chars", text.len());
        Ok(split_lines(&text))
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn layout(&self) -> Layout {
        Layout::Categorized
    }
}
