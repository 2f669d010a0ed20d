//! Update status reconciliation over the monitored/excluded partition

mod tracker;


pub use tracker::StatusCache;
use tracker::StatusTracker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::error::Result;
use crate::probe::{TrackedItem, UpdateProbe};
use crate::store::{ItemStore, MembershipSnapshot};
use crate::types::{AggregateStatus, Event, ItemStatus};

/// The two disjoint membership sets, guarded by one lock
#[derive(Debug, Default)]
struct Partition {
    monitored: Vec<TrackedItem>,
    excluded: Vec<TrackedItem>,
}

/// Maintains the monitored/excluded partition of tracked items
///
/// Every item lives in exactly one of the two sets. A refresh pass probes the
/// monitored snapshot, reclassifies, and moves items: invalid ones out to the
/// excluded set, recovered ones back in. The first refresh additionally
/// schedules a background pass over the excluded set, so items wrongly
/// excluded by a transient failure find their way back without operator
/// intervention.
pub struct UpdateStatusReconciler {
    tracker: StatusTracker,
    store: Arc<dyn ItemStore>,
    event_tx: broadcast::Sender<Event>,

    /// Membership lock; the probe phase runs outside it
    sets: Mutex<Partition>,

    /// Set by the first refresh, which owns scheduling the excluded pass
    initial_pass_done: AtomicBool,
}

impl UpdateStatusReconciler {
    /// Create a reconciler seeded with an initial partition
    ///
    /// Items appearing in both seed sets stay monitored; the excluded copy is
    /// dropped to restore disjointness.
    pub fn new(
        monitored: Vec<TrackedItem>,
        excluded: Vec<TrackedItem>,
        probe: Arc<dyn UpdateProbe>,
        store: Arc<dyn ItemStore>,
        event_buffer: usize,
    ) -> Arc<Self> {
        let excluded: Vec<TrackedItem> = excluded
            .into_iter()
            .filter(|item| !monitored.contains(item))
            .collect();
        let (event_tx, _rx) = broadcast::channel(event_buffer);

        Arc::new(Self {
            tracker: StatusTracker::new(probe),
            store,
            event_tx,
            sets: Mutex::new(Partition {
                monitored,
                excluded,
            }),
            initial_pass_done: AtomicBool::new(false),
        })
    }

    /// Subscribe to membership change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Probe every monitored item and reconcile the partition
    ///
    /// The probe phase runs on a snapshot of the monitored set, outside the
    /// membership lock. Afterwards the partition moves apply under the lock,
    /// the store persists on any net change and exactly one
    /// [`Event::ItemsChanged`] fires, not one per item. The first call also
    /// spawns a fire-and-forget pass over the excluded set; its failures are
    /// logged and never reach the foreground caller.
    pub async fn refresh(self: &Arc<Self>) -> Result<AggregateStatus> {
        let monitored = { self.sets.lock().await.monitored.clone() };
        let cache = self.tracker.renew_all(&monitored).await;
        self.apply_partition(&cache).await?;

        if !self.initial_pass_done.swap(true, Ordering::SeqCst) {
            let reconciler = Arc::clone(self);
            tokio::spawn(async move {
                reconciler.refresh_excluded().await;
            });
        }

        Ok(cache.aggregate())
    }

    /// Background pass over the excluded snapshot
    ///
    /// Builds a throwaway cache so a pass over excluded items never clobbers
    /// the foreground status cache.
    async fn refresh_excluded(&self) {
        let excluded = { self.sets.lock().await.excluded.clone() };
        if excluded.is_empty() {
            return;
        }

        tracing::debug!(items = excluded.len(), "probing excluded items");
        let cache = self.tracker.probe_all(&excluded).await;
        if let Err(e) = self.apply_partition(&cache).await {
            tracing::error!(error = %e, "excluded item reconciliation failed");
        }
    }

    /// Move items between sets according to `cache` and persist on net change
    async fn apply_partition(&self, cache: &StatusCache) -> Result<bool> {
        let mut sets = self.sets.lock().await;
        let Partition {
            monitored,
            excluded,
        } = &mut *sets;

        let mut changed = false;
        for item in cache.items_with(ItemStatus::Invalid) {
            changed |= move_item(monitored, excluded, item);
        }
        for status in [ItemStatus::Outdated, ItemStatus::Latest] {
            for item in cache.items_with(status) {
                changed |= move_item(excluded, monitored, item);
            }
        }

        if changed {
            let snapshot = MembershipSnapshot {
                monitored: monitored.clone(),
                excluded: excluded.clone(),
            };
            // persisted under the membership lock so snapshots land in order
            self.store.save(&snapshot, false).await?;
            self.event_tx.send(Event::ItemsChanged).ok();
        }
        Ok(changed)
    }

    /// Aggregate status from the last completed refresh
    ///
    /// [`AggregateStatus::NoItems`] until the first refresh completes.
    pub async fn aggregate_status(&self) -> AggregateStatus {
        self.tracker.aggregate().await
    }

    /// Items with an update available
    ///
    /// With `block` set this waits for an in-flight refresh before answering;
    /// otherwise it reads the possibly-stale cache immediately.
    pub async fn need_update_items(&self, block: bool) -> Vec<TrackedItem> {
        self.tracker.need_update_items(block).await
    }

    /// Re-probe one item
    ///
    /// Returns the fresh status and whether it changed. A change triggers a
    /// full reconciliation pass plus one change notification on top of
    /// whatever the pass itself emits.
    pub async fn item_status(self: &Arc<Self>, item: &TrackedItem) -> Result<(ItemStatus, bool)> {
        let (status, changed) = self.tracker.probe_one(item).await;
        if changed {
            tracing::debug!(item = %item, ?status, "item status changed");
            self.refresh().await?;
            self.event_tx.send(Event::ItemsChanged).ok();
        }
        Ok((status, changed))
    }

    /// Current membership partition
    pub async fn snapshot(&self) -> MembershipSnapshot {
        let sets = self.sets.lock().await;
        MembershipSnapshot {
            monitored: sets.monitored.clone(),
            excluded: sets.excluded.clone(),
        }
    }
}

/// Move `item` from one set to the other; absent items stay put
fn move_item(from: &mut Vec<TrackedItem>, to: &mut Vec<TrackedItem>, item: &TrackedItem) -> bool {
    match from.iter().position(|i| i == item) {
        Some(index) => {
            to.push(from.remove(index));
            true
        }
        None => false,
    }
}
