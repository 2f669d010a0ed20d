//! Download task engine -- one logical download unit over the external engine

mod group_id;
mod registry;


pub use group_id::GroupIdAllocator;
pub use registry::TaskRegistry;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures::future::join_all;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::engine::{DownloadEngine, DownloadRecord};
use crate::error::{EngineError, Error, Result};
use crate::request::FileRequest;
use crate::types::{Event, TaskId, TransferSignal};
use crate::utils::random_dir_name;

/// One logical download unit, possibly backed by multiple file transfers
///
/// Lifecycle: created empty, requests added, started exactly once (identity
/// fixed at that point), then running/paused until the engine reports
/// completion or cancellation. A completed task auto-cancels itself; a
/// cancelled task removes its engine state, its working directory and its
/// registry entry.
pub struct DownloadTask {
    config: Arc<Config>,
    engine: Arc<dyn DownloadEngine>,
    allocator: Arc<GroupIdAllocator>,
    registry: Arc<TaskRegistry>,

    /// Exclusive working directory for this task's files
    work_dir: PathBuf,

    /// Pending requests; only mutated before `start`
    requests: Mutex<Vec<FileRequest>>,

    /// Identity, assigned exactly once when `start` succeeds
    id: OnceLock<TaskId>,

    /// One-shot flag won by the first successful submission
    started: AtomicBool,

    /// One-shot flag set by the first teardown
    removed: AtomicBool,
}

impl DownloadTask {
    /// Create an empty task with a fresh exclusive working directory
    pub async fn new(
        config: Arc<Config>,
        engine: Arc<dyn DownloadEngine>,
        allocator: Arc<GroupIdAllocator>,
        registry: Arc<TaskRegistry>,
    ) -> Result<Arc<Self>> {
        let work_dir = config.download_cache_dir.join(random_dir_name());
        tokio::fs::create_dir_all(&work_dir).await?;

        Ok(Arc::new(Self {
            config,
            engine,
            allocator,
            registry,
            work_dir,
            requests: Mutex::new(Vec::new()),
            id: OnceLock::new(),
            started: AtomicBool::new(false),
            removed: AtomicBool::new(false),
        }))
    }

    /// The task's identity, once `start` has succeeded
    pub fn id(&self) -> Option<TaskId> {
        self.id.get().copied()
    }

    /// The task's exclusive working directory
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Queue one file request
    ///
    /// May be called any number of times before `start`. A blank URL is
    /// dropped silently; a destination name colliding with the working
    /// directory or a sibling request is auto-renamed.
    pub async fn add_request(
        &self,
        file_name: &str,
        url: &str,
        headers: &BTreeMap<String, String>,
        cookies: &BTreeMap<String, String>,
    ) -> Result<()> {
        if url.trim().is_empty() {
            tracing::debug!(file_name, "dropping request with blank url");
            return Ok(());
        }

        let mut requests = self.requests.lock().await;
        let taken: Vec<PathBuf> = requests.iter().map(|r| r.file_path.clone()).collect();
        let request = FileRequest::build(
            &self.work_dir,
            file_name,
            url,
            headers,
            cookies,
            &taken,
            &self.config,
        )?;
        requests.push(request);
        Ok(())
    }

    /// Start the task
    ///
    /// With no queued requests this fails immediately: no identity is
    /// assigned, the registry is untouched and [`Event::TaskStartFailed`]
    /// fires. Otherwise the identity is fixed (`Single` for one request,
    /// `Group` with a fresh group id for more), every request is submitted
    /// to the engine concurrently, and the first successful submission wins
    /// a one-shot compare-and-set that registers the task and emits
    /// [`Event::TaskStarted`] exactly once. The call resolves only after
    /// every submission has resolved, so callers may inspect the identity
    /// as soon as it returns. If every submission fails, nothing was
    /// registered and the last engine error is reported.
    pub async fn start(self: &Arc<Self>) -> Result<TaskId> {
        let requests = self.requests.lock().await.clone();
        if requests.is_empty() {
            self.registry.emit(Event::TaskStartFailed);
            return Err(Error::NoRequests);
        }

        let id = if requests.len() == 1 {
            TaskId::Single(requests[0].id)
        } else {
            TaskId::Group(self.allocator.allocate())
        };

        let total = requests.len();
        let submissions = requests.iter().map(|request| {
            let task = Arc::clone(self);
            async move {
                task.engine.enqueue(request, id).await?;
                // first successful submission wins the one-shot
                if !task.started.swap(true, Ordering::SeqCst) {
                    task.id.set(id).ok();
                    task.registry.register(id, Arc::clone(&task)).await;
                    task.registry.emit(Event::TaskStarted {
                        id,
                        first_request: request.id,
                    });
                    tracing::info!(%id, requests = total, "download task started");
                }
                Ok::<(), EngineError>(())
            }
        });
        let results = join_all(submissions).await;

        if self.started.load(Ordering::SeqCst) {
            Ok(id)
        } else {
            let attempted = results.len();
            let last = results
                .into_iter()
                .filter_map(|r| r.err())
                .last()
                .unwrap_or_else(|| EngineError::Other("no submission was attempted".into()));
            self.registry.emit(Event::TaskStartFailed);
            Err(Error::AllSubmissionsFailed { attempted, last })
        }
    }

    fn resolved_id(&self) -> Result<TaskId> {
        self.id.get().copied().ok_or(Error::NotStarted)
    }

    /// Pause every transfer of this task
    pub async fn pause(&self) -> Result<()> {
        Ok(self.engine.pause(self.resolved_id()?).await?)
    }

    /// Resume every transfer of this task
    pub async fn resume(&self) -> Result<()> {
        Ok(self.engine.resume(self.resolved_id()?).await?)
    }

    /// Retry this task's failed transfers
    ///
    /// A group has no atomic group-retry primitive, so every member is
    /// retried individually; one member's failure does not stop the rest,
    /// and the first failure is reported once all members were attempted.
    pub async fn retry(&self) -> Result<()> {
        let id = self.resolved_id()?;
        match id {
            TaskId::Single(request) => Ok(self.engine.retry_single(request).await?),
            TaskId::Group(_) => {
                let mut first_err: Option<EngineError> = None;
                for record in self.engine.records(id).await {
                    if let Err(e) = self.engine.retry_single(record.request).await {
                        tracing::warn!(request = %record.request, error = %e, "group member retry failed");
                        first_err.get_or_insert(e);
                    }
                }
                match first_err {
                    Some(e) => Err(Error::Engine(e)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Ask the engine to stop this task's transfers
    ///
    /// Cooperative: files are not deleted here. Teardown runs when the
    /// engine's cancel signal comes back through the registry.
    pub async fn cancel(&self) -> Result<()> {
        Ok(self.engine.cancel(self.resolved_id()?).await?)
    }

    /// Aggregate progress percentage
    ///
    /// `-1` when the task never started or the engine cannot resolve the
    /// identity.
    pub async fn progress(&self) -> i64 {
        match self.id() {
            Some(id) => self.engine.progress(id).await.unwrap_or(-1),
            None => -1,
        }
    }

    /// Resolved destination paths, empty when the identity is unresolved
    pub async fn file_list(&self) -> Vec<PathBuf> {
        match self.id() {
            Some(id) => self
                .engine
                .records(id)
                .await
                .into_iter()
                .map(|r| r.file_path)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Engine transfer records, empty when the identity is unresolved
    pub async fn download_list(&self) -> Vec<DownloadRecord> {
        match self.id() {
            Some(id) => self.engine.records(id).await,
            None => Vec::new(),
        }
    }

    /// React to an engine transfer signal routed via the registry
    ///
    /// Completion auto-cancels the task (a finished task is torn down
    /// immediately rather than left resident); cancellation runs teardown.
    pub(crate) async fn handle_transfer_signal(self: &Arc<Self>, signal: TransferSignal) {
        match signal {
            TransferSignal::Completed => {
                if let Some(id) = self.id() {
                    self.registry.emit(Event::TaskCompleted { id });
                }
                if let Err(e) = self.cancel().await {
                    tracing::warn!(error = %e, "auto-cancel after completion failed");
                }
            }
            TransferSignal::Cancelled => self.remove().await,
        }
    }

    /// Tear down all task state
    ///
    /// Deletes engine-side state, removes the working directory recursively
    /// and unregisters from the registry. Idempotent: teardown runs once,
    /// later calls only re-check the directory, and [`Event::TaskRemoved`]
    /// fires at most once per task.
    pub async fn remove(&self) {
        if let Some(id) = self.id() {
            if !self.removed.swap(true, Ordering::SeqCst) {
                if let Err(e) = self.engine.delete(id).await {
                    tracing::warn!(%id, error = %e, "engine delete during teardown failed");
                }
                self.registry.unregister(id).await;
                self.registry.emit(Event::TaskRemoved { id });
            }
        }

        match tokio::fs::remove_dir_all(&self.work_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = ?self.work_dir, error = %e, "failed to delete working directory");
            }
        }
    }
}
