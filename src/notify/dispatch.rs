// src/notify/dispatch.rs
//! Per-run notification policy: capped, spaced, failure-tolerant.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;

use super::format::{format_listing, format_overflow};
use super::Transport;
use crate::listing::Listing;
use crate::seen::SeenStore;

pub const DEFAULT_MAX_PUSH: usize = 8;
pub const DEFAULT_SPACING: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Listing notifications that were delivered.
    pub sent: usize,
    /// Listing notifications that failed.
    pub failed: usize,
    /// New listings beyond the per-run cap (marked seen, never sent).
    pub overflow: usize,
    pub summary_sent: bool,
}

pub struct NotificationDispatcher {
    transport: Arc<dyn Transport>,
    target: String,
    max_push: usize,
    spacing: Duration,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn Transport>, target: impl Into<String>) -> Self {
        Self {
            transport,
            target: target.into(),
            max_push: DEFAULT_MAX_PUSH,
            spacing: DEFAULT_SPACING,
        }
    }

    pub fn with_max_push(mut self, max_push: usize) -> Self {
        self.max_push = max_push;
        self
    }

    /// Pause between consecutive sends.
    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }

    /// Send up to `max_push` of `new_items` in order, then one overflow summary
    /// if anything is left. Every item is marked seen in `seen`, whether its
    /// send succeeded, failed, or was skipped by the cap.
    pub async fn dispatch(&self, new_items: &[Listing], seen: &mut SeenStore) -> DispatchOutcome {
        let cap = self.max_push.min(new_items.len());
        let (head, rest) = new_items.split_at(cap);
        let mut outcome = DispatchOutcome {
            overflow: rest.len(),
            ..DispatchOutcome::default()
        };

        for (i, listing) in head.iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            match self
                .transport
                .send(&self.target, &format_listing(listing), false)
                .await
            {
                Ok(()) => {
                    outcome.sent += 1;
                    counter!("notifications_sent_total").increment(1);
                }
                Err(e) => {
                    outcome.failed += 1;
                    counter!("notifications_failed_total").increment(1);
                    tracing::warn!(
                        transport = self.transport.name(),
                        source = %listing.source,
                        url = %listing.url,
                        error = %e,
                        "notification send failed"
                    );
                }
            }
            seen.mark(&listing.key());
        }

        if !rest.is_empty() {
            if !head.is_empty() {
                self.pause().await;
            }
            match self
                .transport
                .send(&self.target, &format_overflow(rest.len()), true)
                .await
            {
                Ok(()) => outcome.summary_sent = true,
                Err(e) => {
                    counter!("notifications_failed_total").increment(1);
                    tracing::warn!(
                        transport = self.transport.name(),
                        overflow = rest.len(),
                        error = %e,
                        "overflow summary send failed"
                    );
                }
            }
            for listing in rest {
                seen.mark(&listing.key());
            }
        }

        outcome
    }

    async fn pause(&self) {
        if !self.spacing.is_zero() {
            tokio::time::sleep(self.spacing).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records messages; fails the sends whose 0-based index is listed.
    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<(String, bool)>>,
        fail_on: Vec<usize>,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn send(&self, _target: &str, text: &str, disable_preview: bool) -> Result<(), DeliveryError> {
            let mut sent = self.sent.lock();
            let idx = sent.len();
            sent.push((text.to_string(), disable_preview));
            if self.fail_on.contains(&idx) {
                return Err(DeliveryError::Rejected {
                    status: 429,
                    body: "Too Many Requests".into(),
                });
            }
            Ok(())
        }
        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn items(n: usize) -> Vec<Listing> {
        (0..n)
            .map(|i| Listing {
                source: "A".into(),
                title: format!("Kaksio {i}"),
                price_monthly: Some(700),
                address: String::new(),
                city: "Vaasa".into(),
                url: format!("u{i}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn overflow_sends_cap_plus_one_summary_and_marks_all() {
        let transport = Arc::new(Recording::default());
        let d = NotificationDispatcher::new(transport.clone(), "42")
            .with_max_push(3)
            .with_spacing(Duration::ZERO);
        let mut seen = SeenStore::new();
        let new = items(10);

        let out = d.dispatch(&new, &mut seen).await;

        assert_eq!(out.sent, 3);
        assert_eq!(out.overflow, 7);
        assert!(out.summary_sent);
        let sent = transport.sent.lock();
        assert_eq!(sent.len(), 4);
        assert!(sent[0].0.contains("Kaksio 0"));
        assert!(sent[2].0.contains("Kaksio 2"));
        assert!(sent[3].0.contains("7 lisäosumaa"));
        assert!(sent[3].1, "summary suppresses previews");
        assert!(!sent[0].1);
        assert_eq!(seen.len(), 10);
        assert!(new.iter().all(|l| seen.contains(&l.key())));
    }

    #[tokio::test]
    async fn failed_send_is_counted_out_but_still_marked_seen() {
        let transport = Arc::new(Recording {
            fail_on: vec![1],
            ..Recording::default()
        });
        let d = NotificationDispatcher::new(transport.clone(), "42").with_spacing(Duration::ZERO);
        let mut seen = SeenStore::new();
        let new = items(3);

        let out = d.dispatch(&new, &mut seen).await;

        assert_eq!(out.sent, 2);
        assert_eq!(out.failed, 1);
        assert_eq!(transport.sent.lock().len(), 3);
        assert!(seen.contains(&new[1].key()));
    }

    #[tokio::test]
    async fn failed_summary_still_marks_overflow_seen() {
        let transport = Arc::new(Recording {
            fail_on: vec![1],
            ..Recording::default()
        });
        let d = NotificationDispatcher::new(transport.clone(), "42")
            .with_max_push(1)
            .with_spacing(Duration::ZERO);
        let mut seen = SeenStore::new();

        let out = d.dispatch(&items(4), &mut seen).await;

        assert_eq!(out.sent, 1);
        assert!(!out.summary_sent);
        assert_eq!(seen.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn spacing_applies_between_sends() {
        let transport = Arc::new(Recording::default());
        let d = NotificationDispatcher::new(transport.clone(), "42")
            .with_max_push(3)
            .with_spacing(Duration::from_millis(800));
        let mut seen = SeenStore::new();

        let t0 = tokio::time::Instant::now();
        d.dispatch(&items(4), &mut seen).await;
        // 3 listings + summary = 4 sends, 3 gaps
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_millis(2400));
        assert!(elapsed < Duration::from_millis(3200));
    }

    #[tokio::test]
    async fn nothing_new_sends_nothing() {
        let transport = Arc::new(Recording::default());
        let d = NotificationDispatcher::new(transport.clone(), "42");
        let mut seen = SeenStore::new();
        let out = d.dispatch(&[], &mut seen).await;
        assert_eq!(out, DispatchOutcome::default());
        assert!(transport.sent.lock().is_empty());
    }
}
