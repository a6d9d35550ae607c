// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR neural reader backend
//!
//! Fragments carry a 4-point polygon and recognition confidence and are not
//! categorized.

use super::TextFragment;
use crate::vision::ocr::OcrResult;

/// Convert pipeline regions into fragments, keeping reading order
pub fn fragments_from_result(result: OcrResult) -> Vec<TextFragment> {
    result
        .regions
        .into_iter()
        .map(|region| TextFragment::with_geometry(region.text, region.polygon.to_vec(), region.confidence))
        .collect()
}

#[cfg(feature = "backend-paddle")]
pub use engine::PaddleBackend;

#[cfg(feature = "backend-paddle")]
mod engine {
    use async_trait::async_trait;
    use std::sync::Arc;
    use tracing::{debug, info};

    use super::fragments_from_result;
    use crate::backend::{DecodedImage, Layout, OcrBackend, OcrError, TextFragment};
    use crate::config::PaddleConfig;
    use crate::vision::ocr::PaddleOcrModel;

    /// Neural reader backed by PaddleOCR ONNX sessions loaded at startup
    pub struct PaddleBackend {
        model: Arc<PaddleOcrModel>,
    }

    impl PaddleBackend {
        pub fn load(config: &PaddleConfig) -> anyhow::Result<Self> {
            let model = PaddleOcrModel::new(&config.model_dir, config.detection_threshold)?;
            info!("PaddleOCR backend loaded from {}", config.model_dir.display());
            Ok(Self {
                model: Arc::new(model),
            })
        }
    }

    #[async_trait]
    impl OcrBackend for PaddleBackend {
        async fn recognize(&self, image: &DecodedImage) -> Result<Vec<TextFragment>, OcrError> {
            let model = Arc::clone(&self.model);
            let raster = image.image.clone();

            let result = tokio::task::spawn_blocking(move || model.process(&raster))
                .await
                .map_err(|e| OcrError::Engine(format!("OCR task failed: {}", e)))?
                .map_err(|e| OcrError::Engine(format!("{:#}", e)))?;

            debug!(
                "PaddleOCR found {} regions in {}ms",
                result.regions.len(),
                result.processing_time_ms
            );
            Ok(fragments_from_result(result))
        }

        fn name(&self) -> &'static str {
            "paddleocr"
        }

        fn layout(&self) -> Layout {
            Layout::Regions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::backend::test_support::decoded_text_image;
        use crate::config::ServiceConfig;
        use crate::structure::{shape, Structured};

        #[test]
        fn test_load_missing_models_fails() {
            let mut config = ServiceConfig::default().paddle;
            config.model_dir = "/nonexistent/paddleocr-onnx".into();
            assert!(PaddleBackend::load(&config).is_err());
        }

        #[tokio::test]
        #[ignore] // Only run if model files are downloaded
        async fn test_recognize_rendered_text() {
            let backend = PaddleBackend::load(&ServiceConfig::default().paddle)
                .expect("models expected under ./models/paddleocr-onnx");
            assert_eq!(backend.layout(), Layout::Regions);

            let fragments = backend
                .recognize(&decoded_text_image("LOGIN"))
                .await
                .unwrap();
            assert!(!fragments.is_empty());
            for fragment in &fragments {
                assert_eq!(fragment.bbox.as_ref().map(Vec::len), Some(4));
                let confidence = fragment.confidence.unwrap();
                assert!((0.0..=1.0).contains(&confidence));
            }

            let Structured::Regions(result) = shape(fragments, backend.layout()) else {
                panic!("expected regions result");
            };
            assert!(!result.raw.is_empty());
            assert!(result.raw.iter().all(|r| r["bbox"].as_array().map(Vec::len) == Some(4)));
        }
    }
}
