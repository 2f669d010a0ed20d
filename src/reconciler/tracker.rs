//! Per-item status cache and aggregate computation

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::probe::{TrackedItem, UpdateProbe};
use crate::types::{AggregateStatus, ItemStatus};

/// Probe results from one refresh pass, keyed both ways
#[derive(Clone, Debug, Default)]
pub struct StatusCache {
    by_status: HashMap<ItemStatus, Vec<TrackedItem>>,
    by_item: HashMap<TrackedItem, ItemStatus>,
}

impl StatusCache {
    /// Items classified with `status` in the last pass
    pub fn items_with(&self, status: ItemStatus) -> &[TrackedItem] {
        self.by_status.get(&status).map_or(&[], Vec::as_slice)
    }

    /// Last known status of one item, if it was ever probed
    pub fn status_of(&self, item: &TrackedItem) -> Option<ItemStatus> {
        self.by_item.get(item).copied()
    }

    /// Whether the cache holds no classifications
    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }

    /// Derive the aggregate status
    ///
    /// Any outdated item dominates; otherwise any latest item; otherwise any
    /// invalid item; an empty cache has no aggregate to report.
    pub fn aggregate(&self) -> AggregateStatus {
        if !self.items_with(ItemStatus::Outdated).is_empty() {
            AggregateStatus::HasOutdated
        } else if !self.items_with(ItemStatus::Latest).is_empty() {
            AggregateStatus::AllLatest
        } else if !self.items_with(ItemStatus::Invalid).is_empty() {
            AggregateStatus::AllInvalid
        } else {
            AggregateStatus::NoItems
        }
    }

    fn record(&mut self, item: TrackedItem, status: ItemStatus) {
        if let Some(previous) = self.by_item.insert(item.clone(), status) {
            if let Some(bucket) = self.by_status.get_mut(&previous) {
                bucket.retain(|i| i != &item);
            }
        }
        self.by_status.entry(status).or_default().push(item);
    }
}

/// Runs probe passes and answers status queries
///
/// Holds the last foreground cache plus a refresh gate that blocking callers
/// can wait on while a pass is in flight.
pub(crate) struct StatusTracker {
    probe: Arc<dyn UpdateProbe>,
    /// Held for the duration of a foreground refresh pass
    refresh_gate: Mutex<()>,
    /// Cache from the last completed foreground pass
    last: Mutex<StatusCache>,
}

impl StatusTracker {
    pub(crate) fn new(probe: Arc<dyn UpdateProbe>) -> Self {
        Self {
            probe,
            refresh_gate: Mutex::new(()),
            last: Mutex::new(StatusCache::default()),
        }
    }

    /// Probe every item and build a cache without touching the stored one
    ///
    /// Items are probed sequentially, a deliberate policy to bound load on
    /// the external probe. Probe failures classify as `NetworkError`.
    pub(crate) async fn probe_all(&self, items: &[TrackedItem]) -> StatusCache {
        let mut cache = StatusCache::default();
        for item in items {
            let status = match self.probe.probe(item).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(item = %item, error = %e, "probe failed");
                    ItemStatus::NetworkError
                }
            };
            cache.record(item.clone(), status);
        }
        cache
    }

    /// Run a foreground pass: probe `items` and replace the stored cache
    pub(crate) async fn renew_all(&self, items: &[TrackedItem]) -> StatusCache {
        let _gate = self.refresh_gate.lock().await;
        let cache = self.probe_all(items).await;
        *self.last.lock().await = cache.clone();
        cache
    }

    /// Aggregate of the last completed foreground pass
    pub(crate) async fn aggregate(&self) -> AggregateStatus {
        self.last.lock().await.aggregate()
    }

    /// Items last classified as outdated
    ///
    /// With `block` set, waits for an in-flight refresh pass to finish;
    /// otherwise answers from the possibly-stale stored cache immediately.
    pub(crate) async fn need_update_items(&self, block: bool) -> Vec<TrackedItem> {
        if block {
            let _gate = self.refresh_gate.lock().await;
        }
        self.last
            .lock()
            .await
            .items_with(ItemStatus::Outdated)
            .to_vec()
    }

    /// Re-probe one item and fold the result into the stored cache
    ///
    /// Returns the fresh status and whether it differs from the last known
    /// classification.
    pub(crate) async fn probe_one(&self, item: &TrackedItem) -> (ItemStatus, bool) {
        let status = match self.probe.probe(item).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(item = %item, error = %e, "probe failed");
                ItemStatus::NetworkError
            }
        };

        let mut last = self.last.lock().await;
        let changed = last.status_of(item) != Some(status);
        last.record(item.clone(), status);
        (status, changed)
    }
}
