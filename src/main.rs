use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, gateway_timeout, router};
use api_shared::HealthService;
use navigator_core::{Catalog, WizardKind};
use navigator_gateway::{GatewayConfig, LlmGateway};

/// Main entry point for the Knowledge Navigator
///
/// Loads and checks the built-in catalogue, resolves the AI gateway configuration and
/// serves the REST API until Ctrl-C.
///
/// # Environment Variables
/// - `NAVIGATOR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `NAVIGATOR_AI_PROVIDER`: AI backend (default: "google")
/// - `NAVIGATOR_AI_MODEL`: Model name (default: "gemini-2.5-flash")
/// - `NAVIGATOR_AI_API_KEY`: Backend API key, falling back to `API_KEY`
/// - `NAVIGATOR_AI_TIMEOUT_SECS`: Per-call gateway timeout in seconds (default: 90)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("navigator=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("NAVIGATOR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let catalog = Catalog::builtin()?;
    for kind in WizardKind::ALL {
        let tree = catalog.tree(kind);
        let orphans = tree.orphans();
        if !orphans.is_empty() {
            let names: Vec<&str> = orphans.iter().map(|k| k.as_str()).collect();
            tracing::warn!(tree = tree.name(), "unreachable nodes: {}", names.join(", "));
        }
    }

    let config = GatewayConfig::from_env_values(
        std::env::var("NAVIGATOR_AI_PROVIDER").ok(),
        std::env::var("NAVIGATOR_AI_MODEL").ok(),
        std::env::var("NAVIGATOR_AI_API_KEY").ok(),
        std::env::var("API_KEY").ok(),
    )?;
    let health = HealthService::check_health(config.is_configured());
    tracing::info!(
        provider = config.provider(),
        model = config.model(),
        gateway_configured = health.gateway_configured,
        "{}",
        health.message
    );

    let state = AppState::new(
        catalog,
        Arc::new(LlmGateway::new(config)),
        health.gateway_configured,
    )
    .with_gateway_timeout(gateway_timeout(
        std::env::var("NAVIGATOR_AI_TIMEOUT_SECS").ok().as_deref(),
    )?);

    tracing::info!("++ Starting Knowledge Navigator REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down");
        })
        .await?;

    Ok(())
}
