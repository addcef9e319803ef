#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use glyph_server::handler::routes;
use glyph_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    body_limit_for_upload,
};
use glyph_server::service::{ServiceConfig, ServiceState};

use crate::config::{Cli, MiddlewareConfig, create_ocr_provider};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "glyph_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "glyph_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "glyph_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.telemetry
        .init_tracing()
        .context("failed to initialize logging")?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting glyph OCR gateway"
    );

    cli.log();
    cli.validate()?;

    let service_config = cli.service_config()?;
    let provider = create_ocr_provider(&cli)?;
    let state = ServiceState::from_config(&service_config, provider)
        .context("failed to create service state")?;
    let router = create_router(state, &service_config, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery: catches panics and enforces the request timeout
/// 2. Observability: request IDs and tracing spans
/// 3. Security: CORS, security headers, compression, body limit
/// 4. Metrics: per-request category, status and latency
/// 5. Routes: OCR handlers and the OpenAPI document
fn create_router(
    state: ServiceState,
    service: &ServiceConfig,
    middleware: &MiddlewareConfig,
) -> Router {
    let max_body_size = body_limit_for_upload(service.validation.max_upload_size());

    routes(None)
        .with_open_api(middleware.openapi.clone())
        .with_state(state)
        .with_metrics()
        .with_security(&middleware.cors, max_body_size)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
