/*!
Background executor for `Effect::Async(TaskKind)`.

`TaskExecutor::spawn` allocates a task id and pushes the task into an
unbounded channel. A single worker loop drains the channel and runs each
task on its own tokio task, so a slow collection never delays another.
Lifecycle events (`TaskStarted`, `TaskFinished`) are sent back on the
event channel handed to [`TaskExecutor::new`].

Pending tasks are dropped when the executor and all its clones are gone.
A result sent after the receiver closed is discarded silently; the form's
generation guard covers results that do arrive late.
*/

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::effects::{InternalEvent, TaskKind, TaskResultKind};
use crate::remote::CollectionClient;

/// Monotonic task identifier.
pub type TaskId = u64;

/// Handle for scheduling background tasks. Cloning only clones the sender.
#[derive(Clone)]
pub struct TaskExecutor {
    tx: mpsc::UnboundedSender<Dispatch>,
}

struct Dispatch {
    id: TaskId,
    kind: TaskKind,
}

impl TaskExecutor {
    /// Create the executor and spawn its worker loop. Requires a tokio runtime.
    pub fn new(client: CollectionClient, event_tx: mpsc::UnboundedSender<InternalEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Dispatch>();
        Worker {
            rx,
            client,
            event_tx,
        }
        .spawn();
        Self { tx }
    }

    /// Schedule a task and return its id.
    pub fn spawn(&self, kind: TaskKind) -> TaskId {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.tx.send(Dispatch { id, kind }) {
            warn!("task executor channel closed; dropped task: {}", e.0.kind);
        }
        id
    }
}

struct Worker {
    rx: mpsc::UnboundedReceiver<Dispatch>,
    client: CollectionClient,
    event_tx: mpsc::UnboundedSender<InternalEvent>,
}

impl Worker {
    fn spawn(mut self) {
        tokio::spawn(async move {
            while let Some(dispatch) = self.rx.recv().await {
                let client = self.client.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(run(dispatch, client, event_tx));
            }
            info!("task executor worker stopped (channel closed)");
        });
    }
}

async fn run(
    dispatch: Dispatch,
    client: CollectionClient,
    event_tx: mpsc::UnboundedSender<InternalEvent>,
) {
    let Dispatch { id, kind } = dispatch;
    let _ = event_tx.send(InternalEvent::TaskStarted {
        id,
        label: kind.to_string(),
    });
    let result = match kind {
        TaskKind::FetchCollection { ticket, collection } => {
            match client.fetch_collection_timed(collection).await {
                Ok(timed) => TaskResultKind::CollectionFetched {
                    ticket,
                    collection,
                    items: timed.items,
                    fetch_time_ms: timed.fetch_time_ms,
                    server_time_ms: timed.server_time_ms,
                },
                Err(e) => {
                    warn!("[task:{id}] fetching {collection} failed: {e}");
                    TaskResultKind::CollectionFailed {
                        ticket,
                        collection,
                        error: e.to_string(),
                    }
                }
            }
        }
    };
    if event_tx.send(InternalEvent::TaskFinished { id, result }).is_err() {
        debug!("[task:{id}] finished after the event receiver closed");
    }
}
