// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod listing;
pub mod metrics;
pub mod pipeline;
pub mod relevance;
pub mod seen;

// Source adapters, fetch harness, background loop
pub mod ingest;

// Outbound notifications
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::error::{ConfigError, DeliveryError, SourceFetchError, StoreError};
pub use crate::ingest::types::SourceAdapter;
pub use crate::listing::{Listing, ListingKey};
pub use crate::notify::{NotificationDispatcher, Transport};
pub use crate::pipeline::{Pipeline, RunConfig, RunReport};
pub use crate::seen::SeenStore;
