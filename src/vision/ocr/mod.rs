// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! Pre- and post-processing is always built; the ONNX sessions require the
//! `backend-paddle` feature.
//!
//! Components:
//! - `detection` - Text region detection (PP-OCR DB model)
//! - `recognition` - Text recognition from detected regions
//! - `preprocessing` - Image preprocessing for models
//! - `model` - Combined OCR pipeline

pub mod detection;
pub mod model;
pub mod preprocessing;
pub mod recognition;

pub use detection::{boxes_from_probability_map, TextBox};
pub use model::{OcrResult, TextRegion};
pub use recognition::{ctc_greedy_decode, load_dictionary, RecognizedText};

#[cfg(feature = "backend-paddle")]
pub use model::PaddleOcrModel;
