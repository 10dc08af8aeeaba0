//! Rental watcher binary entrypoint.
//! Composition root: parses settings, wires the pipeline, owns the polling
//! task handle and the optional liveness server.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rental_watcher::config::Cli;
use rental_watcher::ingest::scheduler::spawn_scheduler;
use rental_watcher::metrics::Metrics;
use rental_watcher::{api, Pipeline};

/// Compact logs by default, JSON lines when LOG_FORMAT=json.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rental_watcher=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Cli::parse()
        .into_settings()
        .context("invalid configuration")?;
    let pipeline = Arc::new(Pipeline::from_settings(&settings)?);

    let Some(interval) = settings.interval else {
        let report = pipeline.run_once().await?;
        tracing::info!(sent = report.sent, "single run complete");
        return Ok(());
    };

    tracing::info!(
        city = %settings.run.city,
        max_rent = settings.run.max_rent,
        interval_secs = interval.as_secs(),
        "starting polling loop"
    );
    let poller = spawn_scheduler(Arc::clone(&pipeline), interval);

    match settings.health_addr {
        Some(addr) => {
            let mut app = api::router();
            if settings.metrics {
                app = app.merge(Metrics::init()?.router());
            }
            tokio::select! {
                res = poller => res.context("polling loop stopped")?,
                res = api::serve(addr, app) => res.context("health server stopped")?,
            }
        }
        None => poller.await.context("polling loop stopped")?,
    }
    Ok(())
}
