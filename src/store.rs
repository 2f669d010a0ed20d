//! Persistence interface for tracked-item membership

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::probe::TrackedItem;

/// Snapshot of the monitored/excluded partition persisted after each net change
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSnapshot {
    /// Items currently monitored for updates
    pub monitored: Vec<TrackedItem>,

    /// Items currently excluded as invalid
    pub excluded: Vec<TrackedItem>,
}

/// External persistent store for membership snapshots
///
/// Writes are issued with the reconciler's membership lock held, so they
/// arrive serialized per reconciler instance.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist the snapshot; `flush` forces an immediate durable write
    async fn save(&self, snapshot: &MembershipSnapshot, flush: bool) -> Result<()>;
}
