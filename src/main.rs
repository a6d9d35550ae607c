// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use ocr_analyze_node::{backend::build_backend, cli::Cli, config::ServiceConfig, start_server};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.apply(ServiceConfig::from_env());
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Starting OCR analyze node {}",
        ocr_analyze_node::version::get_version_string()
    );

    let backend = build_backend(&config).context("Failed to initialize OCR backend")?;
    tracing::info!("OCR backend: {}", backend.name());

    start_server(&config, backend).await
}
