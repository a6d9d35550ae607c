// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze response types

use serde::Serialize;

use crate::structure::Structured;

/// Either the structured result or an error message, never both
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalyzeResponse {
    Success { structured: Structured },
    Error { message: String },
}

impl AnalyzeResponse {
    pub fn success(structured: Structured) -> Self {
        AnalyzeResponse::Success { structured }
    }

    pub fn error(message: impl Into<String>) -> Self {
        AnalyzeResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalyzeResponse::Success { .. })
    }
}
