// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Upload decoding and format detection
//! - The PaddleOCR detection/recognition pipeline used by the neural backend

pub mod image_utils;
pub mod ocr;

pub use image_utils::{decode_image_bytes, detect_format, format_to_extension, ImageError, ImageInfo};
