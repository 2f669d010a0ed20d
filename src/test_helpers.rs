//! In-memory collaborator doubles shared by the unit tests

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::config::Config;
use crate::engine::{DownloadEngine, DownloadRecord};
use crate::error::{EngineError, Error, Result};
use crate::probe::{TrackedItem, UpdateProbe};
use crate::request::FileRequest;
use crate::store::{ItemStore, MembershipSnapshot};
use crate::task::{DownloadTask, GroupIdAllocator, TaskRegistry};
use crate::types::{Event, ItemStatus, RequestId, TaskId};

/// Collect everything currently buffered on an event channel
pub(crate) fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Scriptable in-memory engine that records every call it receives
#[derive(Default)]
pub(crate) struct MockEngine {
    downloads: Mutex<HashMap<RequestId, (TaskId, PathBuf)>>,
    fail_urls: Mutex<HashSet<String>>,
    fail_retries: Mutex<HashSet<RequestId>>,
    progress: Mutex<HashMap<TaskId, i64>>,
    calls: Mutex<Vec<String>>,
}

impl MockEngine {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reject any submission for `url`
    pub(crate) fn fail_url(&self, url: &str) {
        self.fail_urls.lock().unwrap().insert(url.to_string());
    }

    /// Fail every retry of `id`
    pub(crate) fn fail_retry(&self, id: RequestId) {
        self.fail_retries.lock().unwrap().insert(id);
    }

    pub(crate) fn set_progress(&self, id: TaskId, value: i64) {
        self.progress.lock().unwrap().insert(id, value);
    }

    /// Chronological log of every engine call, as `"method:argument"`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of transfers currently known to the engine
    pub(crate) fn transfer_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    fn log(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl DownloadEngine for MockEngine {
    async fn enqueue(&self, request: &FileRequest, task: TaskId) -> Result<(), EngineError> {
        self.log(format!("enqueue:{}", request.id));
        if self.fail_urls.lock().unwrap().contains(&request.url) {
            return Err(EngineError::SubmitRejected {
                id: request.id,
                reason: "scripted rejection".to_string(),
            });
        }
        self.downloads
            .lock()
            .unwrap()
            .insert(request.id, (task, request.file_path.clone()));
        Ok(())
    }

    async fn pause(&self, id: TaskId) -> Result<(), EngineError> {
        self.log(format!("pause:{id}"));
        Ok(())
    }

    async fn resume(&self, id: TaskId) -> Result<(), EngineError> {
        self.log(format!("resume:{id}"));
        Ok(())
    }

    async fn cancel(&self, id: TaskId) -> Result<(), EngineError> {
        self.log(format!("cancel:{id}"));
        Ok(())
    }

    async fn retry_single(&self, id: RequestId) -> Result<(), EngineError> {
        self.log(format!("retry:{id}"));
        if self.fail_retries.lock().unwrap().contains(&id) {
            return Err(EngineError::Other("scripted retry failure".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<(), EngineError> {
        self.log(format!("delete:{id}"));
        self.downloads
            .lock()
            .unwrap()
            .retain(|_, (task, _)| *task != id);
        Ok(())
    }

    async fn progress(&self, id: TaskId) -> Option<i64> {
        if let Some(value) = self.progress.lock().unwrap().get(&id) {
            return Some(*value);
        }
        let known = self
            .downloads
            .lock()
            .unwrap()
            .values()
            .any(|(task, _)| *task == id);
        known.then_some(0)
    }

    async fn records(&self, id: TaskId) -> Vec<DownloadRecord> {
        let mut records: Vec<DownloadRecord> = self
            .downloads
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, (task, _))| *task == id)
            .map(|(request, (_, file_path))| DownloadRecord {
                request: *request,
                file_path: file_path.clone(),
                progress: 0,
            })
            .collect();
        records.sort_by_key(|r| r.request);
        records
    }
}

/// Scriptable probe; unscripted items fail the probe call
#[derive(Default)]
pub(crate) struct MockProbe {
    statuses: Mutex<HashMap<String, ItemStatus>>,
    probes: Mutex<HashMap<String, usize>>,
}

impl MockProbe {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn set_status(&self, key: &str, status: ItemStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(key.to_string(), status);
    }

    /// Number of times `key` was probed
    pub(crate) fn probes_of(&self, key: &str) -> usize {
        self.probes.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

#[async_trait]
impl UpdateProbe for MockProbe {
    async fn probe(&self, item: &TrackedItem) -> Result<ItemStatus> {
        *self.probes.lock().unwrap().entry(item.key.clone()).or_insert(0) += 1;
        self.statuses
            .lock()
            .unwrap()
            .get(&item.key)
            .copied()
            .ok_or_else(|| Error::Probe(format!("unscripted item {item}")))
    }
}

/// Store double capturing every persisted snapshot
#[derive(Default)]
pub(crate) struct MockStore {
    saves: Mutex<Vec<(MembershipSnapshot, bool)>>,
}

impl MockStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn saves(&self) -> Vec<(MembershipSnapshot, bool)> {
        self.saves.lock().unwrap().clone()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }
}

#[async_trait]
impl ItemStore for MockStore {
    async fn save(&self, snapshot: &MembershipSnapshot, flush: bool) -> Result<()> {
        self.saves.lock().unwrap().push((snapshot.clone(), flush));
        Ok(())
    }
}

/// Wired-up task fixture over a temporary cache directory
pub(crate) struct TaskHarness {
    pub(crate) dir: TempDir,
    pub(crate) config: Arc<Config>,
    pub(crate) engine: Arc<MockEngine>,
    pub(crate) allocator: Arc<GroupIdAllocator>,
    pub(crate) registry: Arc<TaskRegistry>,
}

impl TaskHarness {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(Config {
            download_cache_dir: dir.path().join("cache"),
            ..Config::default()
        });
        let registry = TaskRegistry::new(config.event_buffer);
        Self {
            dir,
            config,
            engine: MockEngine::new(),
            allocator: Arc::new(GroupIdAllocator::new()),
            registry,
        }
    }

    pub(crate) async fn task(&self) -> Arc<DownloadTask> {
        DownloadTask::new(
            Arc::clone(&self.config),
            Arc::clone(&self.engine) as Arc<dyn DownloadEngine>,
            Arc::clone(&self.allocator),
            Arc::clone(&self.registry),
        )
        .await
        .unwrap()
    }

    /// Queue a header-less, cookie-less request
    pub(crate) async fn add(&self, task: &DownloadTask, file_name: &str, url: &str) {
        task.add_request(file_name, url, &Default::default(), &Default::default())
            .await
            .unwrap();
    }
}
