//! Error types for update-dl
//!
//! Propagation policy: locally recoverable conditions (blank URL, duplicate
//! destination name, already-removed task) are absorbed silently or via
//! sentinel values; engine-level and probe-level failures surface to the
//! immediate caller unchanged; teardown never raises on "already gone".

use thiserror::Error;

use crate::types::{RequestId, TaskId};

/// Result type alias for update-dl operations
///
/// The error parameter defaults to [`Error`] but can be overridden, so
/// engine-facing code may write `Result<(), EngineError>` with the same
/// alias in scope.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for update-dl
#[derive(Debug, Error)]
pub enum Error {
    /// `start` was called on a task with no queued requests
    #[error("task has no requests to start")]
    NoRequests,

    /// Every submission to the download engine failed
    #[error("all {attempted} submissions failed")]
    AllSubmissionsFailed {
        /// How many requests were submitted
        attempted: usize,
        /// The last submission failure observed
        #[source]
        last: EngineError,
    },

    /// A lifecycle operation was invoked on a task whose identity was never assigned
    #[error("task has not been started")]
    NotStarted,

    /// Error reported by the external download engine
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The external update probe failed
    #[error("probe error: {0}")]
    Probe(String),

    /// The persistent item store failed
    #[error("store error: {0}")]
    Store(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the external download engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected a submission
    #[error("submission rejected for request {id}: {reason}")]
    SubmitRejected {
        /// The request whose submission was rejected
        id: RequestId,
        /// Engine-side reason
        reason: String,
    },

    /// The engine cannot resolve the given identity
    #[error("unknown identity {id}")]
    UnknownId {
        /// The unresolvable identity
        id: TaskId,
    },

    /// Any other engine-side failure
    #[error("{0}")]
    Other(String),
}
