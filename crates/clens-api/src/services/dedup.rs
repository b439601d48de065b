//! Time-bounded dedup cache for tracked persons.
//!
//! The upstream pipeline re-reports the same tracked person on every frame;
//! this cache remembers which tracker ids have already been counted so a
//! person standing in view for an hour is counted once, not thousands of
//! times.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::warn;

/// Maximum number of tracker ids to remember.
///
/// The purge is time-based; this cap bounds memory if a misbehaving
/// upstream floods the cache with fresh ids inside one expiry window.
const MAX_TRACKED_ENTRIES: usize = 100_000;

/// Process-wide set of recently counted tracker ids.
///
/// Within one request the caller purges once up front, then checks each
/// detection and marks it only after its counters were written; the lock
/// makes the check and the mark individually atomic across concurrent
/// requests.
pub struct DedupCache {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
    expiry: Duration,
}

impl DedupCache {
    /// Create a cache whose entries expire after `expiry_seconds`.
    pub fn new(expiry_seconds: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiry: Duration::seconds(expiry_seconds as i64),
        }
    }

    /// Drop entries last seen before `now - expiry`.
    ///
    /// Called once per request before the per-detection loop; eviction is
    /// lazy and eventually consistent, not a strict sliding window.
    pub async fn purge_expired(&self, now: DateTime<Utc>) {
        let cutoff = now - self.expiry;
        let mut entries = self.entries.write().await;
        entries.retain(|_, last_seen| *last_seen >= cutoff);
    }

    /// Whether this tracker id was counted within the current window.
    pub async fn is_seen(&self, tracker_id: &str) -> bool {
        self.entries.read().await.contains_key(tracker_id)
    }

    /// Record a tracker id as counted at `now`.
    ///
    /// When the cache is at capacity the oldest entries are evicted first,
    /// so a flood of new ids degrades toward recounting rather than
    /// unbounded growth.
    pub async fn mark_seen(&self, tracker_id: &str, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;

        if entries.len() >= MAX_TRACKED_ENTRIES && !entries.contains_key(tracker_id) {
            let overflow = entries.len() + 1 - MAX_TRACKED_ENTRIES;
            let mut by_age: Vec<_> = entries.iter().map(|(id, ts)| (id.clone(), *ts)).collect();
            by_age.sort_by_key(|(_, ts)| *ts);
            for (id, _) in by_age.into_iter().take(overflow) {
                entries.remove(&id);
            }
            warn!("Dedup cache exceeded capacity, evicted {} oldest entries", overflow);
        }

        entries.insert(tracker_id.to_string(), now);
    }

    /// Number of tracked entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
