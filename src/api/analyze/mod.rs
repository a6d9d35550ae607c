// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image analysis endpoint module
//!
//! Provides POST /analyze for turning an uploaded screenshot into
//! structured text.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{analyze_handler, analyze_upload};
pub use request::{read_upload, FILE_FIELD};
pub use response::AnalyzeResponse;
