//! Process-wide task directory and event fan-out

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use super::DownloadTask;
use crate::types::{Event, TaskId, TransferSignal};

/// Directory of live tasks plus the broadcast event channel
///
/// Process-scoped but constructor-injected: every task gets a handle at
/// creation instead of reaching for a global. The registry also routes the
/// engine's transfer signals to the owning task, which is what drives the
/// auto-cancel-on-complete and teardown-on-cancel behavior.
pub struct TaskRegistry {
    tasks: Mutex<HashMap<TaskId, Arc<DownloadTask>>>,
    event_tx: broadcast::Sender<Event>,
}

impl TaskRegistry {
    /// Create a registry whose event channel buffers `event_buffer` events
    pub fn new(event_buffer: usize) -> Arc<Self> {
        let (event_tx, _rx) = broadcast::channel(event_buffer);
        Arc::new(Self {
            tasks: Mutex::new(HashMap::new()),
            event_tx,
        })
    }

    /// Subscribe to task events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Register a live task under its identity
    pub(crate) async fn register(&self, id: TaskId, task: Arc<DownloadTask>) {
        self.tasks.lock().await.insert(id, task);
    }

    /// Remove a task from the directory; safe to call on an absent identity
    pub(crate) async fn unregister(&self, id: TaskId) {
        self.tasks.lock().await.remove(&id);
    }

    /// Whether a task is currently registered
    pub async fn contains(&self, id: TaskId) -> bool {
        self.tasks.lock().await.contains_key(&id)
    }

    /// Number of registered tasks
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Whether no tasks are registered
    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    /// Route an engine transfer signal to the owning task
    ///
    /// Signals for unknown identities are dropped: the engine may still emit
    /// them for a task that already tore itself down.
    pub async fn dispatch(&self, id: TaskId, signal: TransferSignal) {
        let task = { self.tasks.lock().await.get(&id).cloned() };
        match task {
            Some(task) => task.handle_transfer_signal(signal).await,
            None => {
                tracing::debug!(%id, ?signal, "transfer signal for unknown task ignored");
            }
        }
    }

    /// Emit an event to all subscribers
    ///
    /// With no active subscribers the event is silently dropped.
    pub(crate) fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
