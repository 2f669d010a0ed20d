//! External download engine interface
//!
//! The orchestration core never moves bytes itself. Everything below is the
//! narrow seam to the component that does; implementations must honor the
//! per-request headers and retry-attempt limit carried on [`FileRequest`].

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::EngineError;
use crate::request::FileRequest;
use crate::types::{RequestId, TaskId};

/// One transfer record as reported by the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRecord {
    /// Request this record belongs to
    pub request: RequestId,

    /// Destination file path
    pub file_path: PathBuf,

    /// Transfer progress percentage (0..=100)
    pub progress: i64,
}

/// Interface to the external engine performing byte transfer
///
/// Lifecycle calls take the whole [`TaskId`]; the engine derives the
/// single-vs-group dispatch from it. Completion and cancellation are reported
/// back asynchronously through [`crate::task::TaskRegistry::dispatch`].
#[async_trait]
pub trait DownloadEngine: Send + Sync {
    /// Submit one request for transfer under the given task identity
    async fn enqueue(&self, request: &FileRequest, task: TaskId)
        -> Result<(), EngineError>;

    /// Pause every transfer of a task
    async fn pause(&self, id: TaskId) -> Result<(), EngineError>;

    /// Resume every transfer of a task
    async fn resume(&self, id: TaskId) -> Result<(), EngineError>;

    /// Ask the engine to stop a task's transfers
    ///
    /// Cooperative: the engine confirms through its cancel signal, which is
    /// what triggers task teardown.
    async fn cancel(&self, id: TaskId) -> Result<(), EngineError>;

    /// Retry one transfer
    ///
    /// There is no atomic group-retry primitive; group retry enumerates the
    /// members and calls this per transfer.
    async fn retry_single(&self, id: RequestId) -> Result<(), EngineError>;

    /// Delete all engine-side state for a task
    ///
    /// Must be idempotent: deleting an unknown or already-deleted identity
    /// succeeds.
    async fn delete(&self, id: TaskId) -> Result<(), EngineError>;

    /// Aggregate progress percentage for a task
    ///
    /// `None` when the identity cannot be resolved.
    async fn progress(&self, id: TaskId) -> Option<i64>;

    /// Transfer records for a task, empty when the identity is unresolved
    async fn records(&self, id: TaskId) -> Vec<DownloadRecord>;
}
