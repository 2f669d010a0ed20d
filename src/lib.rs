//! # update-dl
//!
//! Orchestration core for applications that track versioned items and
//! download their updates. It owns the bookkeeping, not the bytes: the
//! actual transfer engine, the update probe and the persistent store are
//! injected behind async traits.
//!
//! ## Design Philosophy
//!
//! update-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Engine-agnostic** - Byte transfer lives behind the [`DownloadEngine`] seam
//! - **One task, many files** - A multi-file download is addressed and
//!   controlled as a single unit
//! - **Event-driven** - Consumers subscribe to broadcast events, no polling
//!   required
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use update_dl::{Config, DownloadTask, GroupIdAllocator, TaskRegistry};
//! # use update_dl::{DownloadEngine, DownloadRecord, EngineError, FileRequest, RequestId, TaskId};
//! # struct MyEngine;
//! # #[async_trait::async_trait]
//! # impl DownloadEngine for MyEngine {
//! #     async fn enqueue(&self, _: &FileRequest, _: TaskId) -> Result<(), EngineError> { Ok(()) }
//! #     async fn pause(&self, _: TaskId) -> Result<(), EngineError> { Ok(()) }
//! #     async fn resume(&self, _: TaskId) -> Result<(), EngineError> { Ok(()) }
//! #     async fn cancel(&self, _: TaskId) -> Result<(), EngineError> { Ok(()) }
//! #     async fn retry_single(&self, _: RequestId) -> Result<(), EngineError> { Ok(()) }
//! #     async fn delete(&self, _: TaskId) -> Result<(), EngineError> { Ok(()) }
//! #     async fn progress(&self, _: TaskId) -> Option<i64> { None }
//! #     async fn records(&self, _: TaskId) -> Vec<DownloadRecord> { Vec::new() }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let registry = TaskRegistry::new(config.event_buffer);
//!     let allocator = Arc::new(GroupIdAllocator::new());
//!     let engine = Arc::new(MyEngine);
//!
//!     // Subscribe to events
//!     let mut events = registry.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let task = DownloadTask::new(config, engine, allocator, registry).await?;
//!     task.add_request(
//!         "file.bin",
//!         "https://example.com/file.bin",
//!         &Default::default(),
//!         &Default::default(),
//!     )
//!     .await?;
//!     let id = task.start().await?;
//!     println!("started {id}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// External download engine interface
pub mod engine;
/// Error types
pub mod error;
/// Tracked items and the update probe interface
pub mod probe;
/// Update status reconciliation
pub mod reconciler;
/// File request construction
pub mod request;
/// Membership persistence interface
pub mod store;
/// Download task lifecycle
pub mod task;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::Config;
pub use engine::{DownloadEngine, DownloadRecord};
pub use error::{EngineError, Error, Result};
pub use probe::{TrackedItem, UpdateProbe};
pub use reconciler::{StatusCache, UpdateStatusReconciler};
pub use request::FileRequest;
pub use store::{ItemStore, MembershipSnapshot};
pub use task::{DownloadTask, GroupIdAllocator, TaskRegistry};
pub use types::{
    AggregateStatus, Event, GroupId, ItemStatus, RequestId, TaskId, TransferSignal,
};
