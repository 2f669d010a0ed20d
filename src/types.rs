//! Core identifier, status and event types for update-dl

use serde::{Deserialize, Serialize};

/// Unique identifier for a single file transfer request
///
/// Computed when the request is built (a stable hash of destination path and
/// source URL), so a task's identity can be inspected as soon as `start`
/// returns without a round-trip to the download engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Create a new RequestId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<RequestId> for u64 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl PartialEq<u64> for RequestId {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier shared by every transfer in a multi-file task
///
/// Allocated by [`crate::task::GroupIdAllocator`]; never reused between
/// concurrently started tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl GroupId {
    /// Create a new GroupId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one logical download task
///
/// A task with exactly one request is `Single`; a task with two or more
/// requests is always `Group`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TaskId {
    /// Task backed by exactly one transfer
    Single(RequestId),
    /// Task backed by two or more transfers sharing a group id
    Group(GroupId),
}

impl TaskId {
    /// Whether this identity names a group of transfers
    pub fn is_group(&self) -> bool {
        matches!(self, TaskId::Group(_))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskId::Single(id) => write!(f, "single:{id}"),
            TaskId::Group(id) => write!(f, "group:{id}"),
        }
    }
}

/// Status class assigned to a tracked item by the external probe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// The item could not be validated against its remote source
    Invalid,
    /// A newer version exists remotely
    Outdated,
    /// The item is up to date
    Latest,
    /// The probe could not reach the remote source
    NetworkError,
}

impl ItemStatus {
    /// Whether this status participates in monitored/excluded partitioning
    ///
    /// `NetworkError` passes through unmapped: a transient failure must not
    /// move an item between sets.
    pub fn partitions(&self) -> bool {
        !matches!(self, ItemStatus::NetworkError)
    }
}

/// Aggregate status derived from the per-item status cache
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    /// No items have been classified yet
    NoItems,
    /// At least one item has an update available
    HasOutdated,
    /// Every classified item is up to date
    AllLatest,
    /// Nothing is outdated or latest; everything classified is invalid
    AllInvalid,
}

/// Event emitted on the broadcast channels
///
/// One tagged enum replaces a per-task observer object with multiple
/// independent hooks; subscribers filter by variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A task's first transfer has been accepted by the engine
    TaskStarted {
        /// The identity assigned to the task
        id: TaskId,
        /// The request whose submission won the race
        first_request: RequestId,
    },

    /// A task could not start: it had no requests or every submission failed
    TaskStartFailed,

    /// A task finished transferring and is tearing itself down
    TaskCompleted {
        /// The completed task
        id: TaskId,
    },

    /// A task's engine-side and on-disk state has been removed
    TaskRemoved {
        /// The removed task
        id: TaskId,
    },

    /// Monitored/excluded membership or aggregate status changed
    ItemsChanged,
}

/// Signal from the external engine about one task's transfers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferSignal {
    /// Every transfer of the task finished successfully
    Completed,
    /// The task's transfers were cancelled
    Cancelled,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_task_id_is_not_group() {
        let id = TaskId::Single(RequestId::new(7));
        assert!(!id.is_group());
        assert_eq!(id.to_string(), "single:7");
    }

    #[test]
    fn group_task_id_is_group() {
        let id = TaskId::Group(GroupId::new(3));
        assert!(id.is_group());
        assert_eq!(id.to_string(), "group:3");
    }

    #[test]
    fn request_id_round_trips_through_u64() {
        let id = RequestId::from(42_u64);
        let raw: u64 = id.into();
        assert_eq!(raw, 42);
        assert!(id == 42_u64, "RequestId should equal matching u64");
    }

    #[test]
    fn network_error_does_not_partition() {
        assert!(!ItemStatus::NetworkError.partitions());
        assert!(ItemStatus::Invalid.partitions());
        assert!(ItemStatus::Outdated.partitions());
        assert!(ItemStatus::Latest.partitions());
    }

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let event = Event::TaskStarted {
            id: TaskId::Single(RequestId::new(1)),
            first_request: RequestId::new(1),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "task_started");
        assert_eq!(json["id"]["kind"], "single");

        let json = serde_json::to_value(Event::ItemsChanged).unwrap();
        assert_eq!(json["type"], "items_changed");
    }

    #[test]
    fn item_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ItemStatus::NetworkError).unwrap(),
            "\"network_error\""
        );
        assert_eq!(
            serde_json::to_string(&ItemStatus::Outdated).unwrap(),
            "\"outdated\""
        );
    }
}
