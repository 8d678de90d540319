//! HTTP API for the Aethon document assistant.
//!
//! Exposes the retrieval engine and prompt A/B testing over a JSON API:
//! document upload and clearing, similarity queries, entity extraction,
//! index snapshots, and A/B test management.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{AppState, app_router};

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:8000".to_string() }
    }
}

impl ServerConfig {
    /// Read the bind address from `AETHON_BIND_ADDR`, defaulting to
    /// `0.0.0.0:8000`.
    pub fn from_env() -> Self {
        match std::env::var("AETHON_BIND_ADDR") {
            Ok(bind_addr) => Self { bind_addr },
            Err(_) => Self::default(),
        }
    }
}

/// Bind and serve the API until the process is stopped.
pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = app_router(state);
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.bind_addr))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("aethon-server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
