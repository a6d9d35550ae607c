// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the OCR analyze node

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-14";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} ({})", VERSION_NUMBER, BUILD_DATE)
}
