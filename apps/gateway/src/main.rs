mod assets;
mod config;
mod errors;
mod routes;
mod state;
mod uploads;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::uploads::TimestampNamer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting upload gateway v{}", env!("CARGO_PKG_VERSION"));

    let addr: SocketAddr = config.bind_addr().parse()?;
    let state = AppState::new(config, Arc::new(TimestampNamer));

    // Category directories must exist before the first upload arrives
    state.store.ensure_layout().await?;
    info!("Upload root: {}", state.store.root().display());
    info!("Static assets: {}", state.config.static_dir.display());
    info!(
        "Max request body: {} MiB",
        state.config.max_body_bytes / 1024 / 1024
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
