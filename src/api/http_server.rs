// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::analyze::analyze_handler;
use crate::backend::OcrBackend;
use crate::config::ServiceConfig;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn OcrBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub version: String,
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Analyze endpoint
        .route("/analyze", post(analyze_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn start_server(config: &ServiceConfig, backend: Arc<dyn OcrBackend>) -> anyhow::Result<()> {
    let app = create_router(AppState::new(backend), config.max_upload_bytes);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: state.backend.name().to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
    })
}
