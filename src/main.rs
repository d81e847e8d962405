use crate::config::ProxyConfig;
use crate::services::PageService;
use crate::upstream::{WikiBackend, WikiJsClient};
use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub mod config;
mod domain;
mod error;
mod features;
mod services;
mod upstream;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PageService>,
    pub config: Arc<ProxyConfig>,
}

// tool servers are called from browser-hosted chat UIs, so any origin may call
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    features::api_router()
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // fail fast on a missing API key or malformed settings
    let config = Arc::new(ProxyConfig::from_env()?);
    tracing::info!(?config, "configuration loaded");

    let client = WikiJsClient::new(&config)?;
    tracing::info!(graphql_url = client.graphql_url(), "Wiki.js client ready");

    let backend: Arc<dyn WikiBackend> = Arc::new(client);
    let app_state = AppState {
        service: Arc::new(PageService::new(backend, &config)),
        config: config.clone(),
    };

    let app = build_app(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
    }
}
