// src/pipeline.rs
//! One watcher run: FETCH -> FILTER -> DIFF -> DISPATCH -> PERSIST.
//!
//! Every stage runs exactly once per run and in that order. Per-adapter and
//! per-send failures are absorbed by the stages themselves; only a failed
//! PERSIST makes the run itself fail.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::config::Settings;
use crate::ingest::{self, providers, types::SourceAdapter};
use crate::listing::Listing;
use crate::notify::{NotificationDispatcher, TelegramTransport};
use crate::relevance::select_central;
use crate::seen::SeenStore;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Completed watcher runs.");
        describe_counter!(
            "notifications_sent_total",
            "Listing notifications delivered."
        );
        describe_counter!(
            "notifications_failed_total",
            "Notifications the transport rejected or could not deliver."
        );
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the last watcher run finished."
        );
    });
}

/// Query parameters and state location for a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub city: String,
    pub max_rent: u32,
    /// Courtesy pause between adapters.
    pub pause: Duration,
    pub seen_path: PathBuf,
}

/// What a single run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    /// Listings left after the relevance step.
    pub considered: usize,
    /// True when nothing looked central and the whole batch was kept.
    pub fell_back: bool,
    pub new_items: usize,
    /// Listing notifications delivered. This is the run's result count.
    pub sent: usize,
    pub failed: usize,
    pub overflow: usize,
    pub failed_sources: Vec<&'static str>,
    pub seen_total: usize,
}

pub struct Pipeline {
    adapters: Vec<Box<dyn SourceAdapter>>,
    dispatcher: NotificationDispatcher,
    config: RunConfig,
}

impl Pipeline {
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        dispatcher: NotificationDispatcher,
        config: RunConfig,
    ) -> Self {
        Self {
            adapters,
            dispatcher,
            config,
        }
    }

    /// Wire the configured sites and the Telegram transport.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = providers::html::build_client(settings.http_timeout)
            .context("building HTTP client")?;
        let adapters = settings
            .sources
            .iter()
            .map(|name| {
                providers::by_name(name, client.clone())
                    .with_context(|| format!("unknown listing site '{name}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        let transport = TelegramTransport::new(settings.telegram.bot_token.clone())
            .with_timeout(settings.http_timeout);
        let dispatcher = NotificationDispatcher::new(Arc::new(transport), &settings.telegram.chat_id)
            .with_max_push(settings.max_push)
            .with_spacing(settings.send_spacing);

        Ok(Self::new(adapters, dispatcher, settings.run.clone()))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub async fn run_once(&self) -> Result<RunReport> {
        ensure_metrics_described();
        let cfg = &self.config;
        let mut seen = SeenStore::load(&cfg.seen_path).await;

        // FETCH
        let fetched =
            ingest::fetch_all(&self.adapters, &cfg.city, cfg.max_rent, cfg.pause).await;
        let failed_sources = fetched.failed_sources();
        let fetched_count = fetched.listings.len();

        // FILTER
        let selection = select_central(fetched.listings);
        if selection.fell_back {
            tracing::info!(
                count = selection.listings.len(),
                "no central listings matched, considering the full batch"
            );
        }

        // DIFF
        let new_items = diff_new(&selection.listings, &seen);

        // DISPATCH
        let outcome = self.dispatcher.dispatch(&new_items, &mut seen).await;

        // PERSIST
        seen.save(&cfg.seen_path)
            .await
            .with_context(|| format!("saving seen store to {}", cfg.seen_path.display()))?;

        counter!("pipeline_runs_total").increment(1);
        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        let report = RunReport {
            fetched: fetched_count,
            considered: selection.listings.len(),
            fell_back: selection.fell_back,
            new_items: new_items.len(),
            sent: outcome.sent,
            failed: outcome.failed,
            overflow: outcome.overflow,
            failed_sources,
            seen_total: seen.len(),
        };
        tracing::info!(
            sent = report.sent,
            new = report.new_items,
            failed = report.failed,
            overflow = report.overflow,
            seen_total = report.seen_total,
            fell_back = report.fell_back,
            "run finished"
        );
        Ok(report)
    }
}

/// Listings whose key is not in `seen`, in input order, first occurrence only.
pub fn diff_new(listings: &[Listing], seen: &SeenStore) -> Vec<Listing> {
    let mut batch_keys = HashSet::new();
    listings
        .iter()
        .filter(|l| {
            let key = l.key();
            !seen.contains(&key) && batch_keys.insert(key)
        })
        .cloned()
        .collect()
}
