// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod structure;
pub mod version;
pub mod vision;

pub use api::{create_router, start_server, AnalyzeResponse, AppState};
pub use backend::{build_backend, OcrBackend, OcrError, TextFragment};
pub use config::ServiceConfig;
pub use structure::{categorize, shape, Category, NativeValue, Structured};
