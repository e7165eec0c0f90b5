//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development when only the REST server (with OpenAPI/Swagger UI) is wanted.
//! The workspace's `navigator-run` binary additionally checks the catalogue and logs the
//! gateway configuration at startup.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{gateway_timeout, router, AppState};
use navigator_core::Catalog;
use navigator_gateway::{GatewayConfig, LlmGateway};

/// Main entry point for the Knowledge Navigator REST API server
///
/// # Environment Variables
/// - `NAVIGATOR_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `NAVIGATOR_AI_PROVIDER`: AI backend (default: "google")
/// - `NAVIGATOR_AI_MODEL`: Model name (default: "gemini-2.5-flash")
/// - `NAVIGATOR_AI_API_KEY`: Backend API key, falling back to `API_KEY`
/// - `NAVIGATOR_AI_TIMEOUT_SECS`: Per-call gateway timeout in seconds (default: 90)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the built-in catalogue or the gateway configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("NAVIGATOR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting Knowledge Navigator REST API on {}", addr);

    let config = GatewayConfig::from_env_values(
        std::env::var("NAVIGATOR_AI_PROVIDER").ok(),
        std::env::var("NAVIGATOR_AI_MODEL").ok(),
        std::env::var("NAVIGATOR_AI_API_KEY").ok(),
        std::env::var("API_KEY").ok(),
    )?;
    let gateway_configured = config.is_configured();
    if !gateway_configured {
        tracing::warn!(
            provider = config.provider(),
            "no AI API key configured; AI panels will report errors"
        );
    }

    let state = AppState::new(
        Catalog::builtin()?,
        Arc::new(LlmGateway::new(config)),
        gateway_configured,
    )
    .with_gateway_timeout(gateway_timeout(
        std::env::var("NAVIGATOR_AI_TIMEOUT_SECS").ok().as_deref(),
    )?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
