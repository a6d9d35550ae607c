// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR pipeline: detection, crop, recognition

use image::{DynamicImage, GenericImageView};

use super::detection::TextBox;
use super::preprocessing::PreprocessInfo;

/// Detection model file name inside the model directory
pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";
/// Recognition model file name inside the model directory
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";
/// Character dictionary file name inside the model directory
pub const DICTIONARY_FILE: &str = "ppocr_keys_v1.txt";

/// A recognized text region in original image coordinates
#[derive(Debug, Clone)]
pub struct TextRegion {
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
    /// Corners clockwise from top-left
    pub polygon: [[f32; 2]; 4],
}

/// Result of OCR processing
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Regions in reading order
    pub regions: Vec<TextRegion>,
    pub processing_time_ms: u64,
}

/// Pixel rectangle `(x, y, width, height)` in the original image for a box
/// detected in preprocessed space. `None` when the box collapses to nothing
/// after mapping, e.g. when it lies entirely in the letterbox padding.
pub fn crop_rect(text_box: &TextBox, info: &PreprocessInfo) -> Option<(u32, u32, u32, u32)> {
    let (x1, y1) = info.map_to_original(text_box.x, text_box.y);
    let (x2, y2) = info.map_to_original(text_box.x + text_box.width, text_box.y + text_box.height);

    let x = x1.floor() as u32;
    let y = y1.floor() as u32;
    let w = (x2.ceil() as u32).saturating_sub(x);
    let h = (y2.ceil() as u32).saturating_sub(y);

    (w > 0 && h > 0).then_some((x, y, w, h))
}

/// Polygon of a crop rectangle
pub fn rect_polygon((x, y, w, h): (u32, u32, u32, u32)) -> [[f32; 2]; 4] {
    TextBox {
        x: x as f32,
        y: y as f32,
        width: w as f32,
        height: h as f32,
        confidence: 1.0,
    }
    .corners()
}

/// Crop the region described by `rect` out of `image`
pub fn crop_region(image: &DynamicImage, (x, y, w, h): (u32, u32, u32, u32)) -> DynamicImage {
    let (img_w, img_h) = image.dimensions();
    let w = w.min(img_w.saturating_sub(x));
    let h = h.min(img_h.saturating_sub(y));
    image.crop_imm(x, y, w, h)
}

#[cfg(feature = "backend-paddle")]
pub use pipeline::PaddleOcrModel;

#[cfg(feature = "backend-paddle")]
mod pipeline {
    use anyhow::Result;
    use image::DynamicImage;
    use std::path::Path;
    use std::time::Instant;
    use tracing::{debug, info};

    use super::{
        crop_rect, crop_region, rect_polygon, OcrResult, TextRegion, DETECTION_MODEL_FILE,
        DICTIONARY_FILE, RECOGNITION_MODEL_FILE,
    };
    use crate::vision::ocr::detection::OcrDetectionModel;
    use crate::vision::ocr::preprocessing::{
        preprocess_for_detection, preprocess_for_recognition, PreprocessInfo, OCR_INPUT_SIZE,
    };
    use crate::vision::ocr::recognition::OcrRecognitionModel;

    /// PaddleOCR model for text extraction
    ///
    /// Combines text detection and recognition models for end-to-end OCR.
    /// Sessions are loaded once and shared; calls serialize on the session
    /// mutexes.
    #[derive(Debug)]
    pub struct PaddleOcrModel {
        detection: OcrDetectionModel,
        recognition: OcrRecognitionModel,
    }

    impl PaddleOcrModel {
        /// Load PaddleOCR models from the specified directory
        ///
        /// Expected files:
        /// - det_model.onnx (text detection)
        /// - rec_model.onnx (text recognition)
        /// - ppocr_keys_v1.txt (character dictionary)
        pub fn new<P: AsRef<Path>>(model_dir: P, detection_threshold: f32) -> Result<Self> {
            let dir = model_dir.as_ref();
            debug!("Loading PaddleOCR models from {}", dir.display());

            let detection = OcrDetectionModel::new(dir.join(DETECTION_MODEL_FILE))?
                .with_confidence_threshold(detection_threshold);
            let recognition = OcrRecognitionModel::new(
                dir.join(RECOGNITION_MODEL_FILE),
                dir.join(DICTIONARY_FILE),
            )?;

            info!("✅ PaddleOCR pipeline ready (CPU-only)");
            Ok(Self {
                detection,
                recognition,
            })
        }

        /// Process an image and extract text regions
        pub fn process(&self, image: &DynamicImage) -> Result<OcrResult> {
            let start = Instant::now();
            let info = PreprocessInfo::new(image, OCR_INPUT_SIZE);

            let boxes = self.detection.detect(&preprocess_for_detection(image))?;

            let mut regions = Vec::with_capacity(boxes.len());
            for text_box in boxes.iter().filter(|b| b.is_valid()) {
                let Some(rect) = crop_rect(text_box, &info) else {
                    continue;
                };
                let crop = crop_region(image, rect);
                let recognized = self
                    .recognition
                    .recognize(&preprocess_for_recognition(&crop))?;
                if recognized.is_empty() {
                    continue;
                }

                regions.push(TextRegion {
                    text: recognized.text,
                    confidence: recognized.confidence,
                    polygon: rect_polygon(rect),
                });
            }

            Ok(OcrResult {
                regions,
                processing_time_ms: start.elapsed().as_millis() as u64,
            })
        }
    }

}
