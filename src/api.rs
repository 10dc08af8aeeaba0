// src/api.rs
//! Liveness surface. Shares nothing with the pipeline: no store, no clients.

use axum::{routing::get, Router};

pub fn router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}

/// Serve `app` until the listener fails.
pub async fn serve(addr: std::net::SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "health endpoint listening");
    axum::serve(listener, app).await?;
    Ok(())
}
