// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use std::time::Duration;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::error::SourceFetchError;
use crate::ingest::types::SourceAdapter;
use crate::listing::Listing;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "listings_fetched_total",
            "Listings returned by source adapters."
        );
        describe_counter!("source_errors_total", "Source adapter fetch/parse errors.");
    });
}

/// Result of asking every adapter once.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Listings in adapter order, then within-adapter order.
    pub listings: Vec<Listing>,
    /// `(adapter name, error)` for every adapter that failed.
    pub failures: Vec<(&'static str, SourceFetchError)>,
}

impl FetchOutcome {
    pub fn failed_sources(&self) -> Vec<&'static str> {
        self.failures.iter().map(|(name, _)| *name).collect()
    }
}

/// Query adapters one at a time with `pause` between them.
///
/// A failing adapter contributes nothing and is logged once; the others are
/// unaffected.
pub async fn fetch_all(
    adapters: &[Box<dyn SourceAdapter>],
    city: &str,
    max_rent: u32,
    pause: Duration,
) -> FetchOutcome {
    ensure_metrics_described();

    let mut outcome = FetchOutcome::default();
    for (i, adapter) in adapters.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        match adapter.fetch(city, max_rent).await {
            Ok(mut found) => {
                tracing::debug!(source = adapter.name(), count = found.len(), "source fetched");
                counter!("listings_fetched_total", "source" => adapter.name())
                    .increment(found.len() as u64);
                outcome.listings.append(&mut found);
            }
            Err(e) => {
                tracing::warn!(source = adapter.name(), error = %e, "source fetch failed");
                counter!("source_errors_total", "source" => adapter.name()).increment(1);
                outcome.failures.push((adapter.name(), e));
            }
        }
    }
    outcome
}
