//! Tracked items and the external update probe

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ItemStatus;

/// Opaque reference to a tracked entity
///
/// The external store owns the entity's fields; this core only needs a
/// stable identity for equality and hashing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedItem {
    /// Stable key assigned by the external store
    pub key: String,
}

impl TrackedItem {
    /// Create an item reference from its stable key
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl std::fmt::Display for TrackedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// External component that classifies one tracked item's update status
///
/// The reconciler consumes the classification; the policy behind it (version
/// comparison, availability checks) belongs entirely to the implementation.
#[async_trait]
pub trait UpdateProbe: Send + Sync {
    /// Classify a single item
    async fn probe(&self, item: &TrackedItem) -> Result<ItemStatus>;
}
