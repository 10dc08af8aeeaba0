// src/seen.rs
//! Durable record of listings that were already notified.
//!
//! The file is a pretty-printed JSON object mapping `source|url` keys to a
//! unix timestamp (seconds, fractional). A missing or damaged file loads as
//! an empty store; the worst outcome is a re-notification, which heals on
//! the next successful run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::{fs, io::AsyncWriteExt};

use crate::error::StoreError;
use crate::listing::ListingKey;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeenStore {
    entries: BTreeMap<String, f64>,
}

impl SeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store, degrading to empty on a missing or malformed file.
    pub async fn load(path: &Path) -> Self {
        match Self::try_load(path).await {
            Ok(Some(store)) => {
                tracing::debug!(path = %path.display(), entries = store.len(), "seen store loaded");
                store
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no seen store yet, starting empty");
                Self::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load seen store, starting empty");
                Self::new()
            }
        }
    }

    async fn try_load(path: &Path) -> Result<Option<Self>, StoreError> {
        let raw = match fs::read_to_string(path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entries: BTreeMap<String, f64> = serde_json::from_str(&raw)?;
        Ok(Some(Self { entries }))
    }

    /// Write the whole store to a sibling temp file, then rename it over `path`.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = temp_path(path);

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub fn contains(&self, key: &ListingKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    /// Record `key` as seen now. An existing first-seen time is kept.
    pub fn mark(&mut self, key: &ListingKey) {
        self.mark_at(key, unix_now());
    }

    pub fn mark_at(&mut self, key: &ListingKey, ts: f64) {
        self.entries.entry(key.as_str().to_string()).or_insert(ts);
    }

    pub fn get(&self, key: &ListingKey) -> Option<f64> {
        self.entries.get(key.as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `seen_listings.json` -> `seen_listings.json.tmp`, in the same directory
/// so the final rename never crosses filesystems.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
