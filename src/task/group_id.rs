//! Group id allocation

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::GroupId;

/// First id handed out; engines commonly reserve 0 for "no group"
const FIRST_GROUP_ID: u64 = 1;

/// Process-scoped allocator for group ids
///
/// Injected into every task rather than living as an ambient global. One
/// allocator instance must be shared by all tasks whose identities can
/// coexist in the same engine; allocation is a single atomic fetch-add, so
/// two tasks starting concurrently can never receive the same id.
#[derive(Debug)]
pub struct GroupIdAllocator {
    next: AtomicU64,
}

impl GroupIdAllocator {
    /// Create an allocator starting at the first usable group id
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(FIRST_GROUP_ID),
        }
    }

    /// Hand out the next group id
    pub fn allocate(&self) -> GroupId {
        GroupId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for GroupIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
