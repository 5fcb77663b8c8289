//! Outbound sync queue.
//!
//! Changes are pushed to the remote one at a time, in the order they were
//! recorded, by a single background task. A change that fails is logged and
//! dropped: no retries, no backoff, and the local save it came from has
//! already succeeded.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use nexus_infra::{Change, ChangeSink};

use crate::remote::{RemoteApi, push};

enum Job {
    Push(Change),
    Flush(oneshot::Sender<()>),
}

/// Outcome counters of a worker run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub pushed: usize,
    pub failed: usize,
}

/// Cloneable sender side of the queue. Never blocks.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl SyncHandle {
    pub fn enqueue(&self, change: Change) {
        if self.tx.send(Job::Push(change)).is_err() {
            tracing::warn!("sync worker stopped, change dropped");
        }
    }

    /// Resolves once every change enqueued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

impl ChangeSink for SyncHandle {
    fn record(&self, change: Change) {
        self.enqueue(change);
    }
}

/// Owns the worker task. The worker ends once every [`SyncHandle`] is dropped.
#[derive(Debug)]
pub struct SyncQueue {
    handle: SyncHandle,
    worker: JoinHandle<SyncStats>,
}

impl SyncQueue {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn(remote: Arc<dyn RemoteApi>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(remote, rx));
        Self {
            handle: SyncHandle { tx },
            worker,
        }
    }

    pub fn handle(&self) -> SyncHandle {
        self.handle.clone()
    }

    /// Drain what is queued and stop the worker.
    ///
    /// Waits for every outstanding handle clone to be dropped.
    pub async fn shutdown(self) -> SyncStats {
        self.handle.flush().await;
        drop(self.handle);
        match self.worker.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "sync worker ended abnormally");
                SyncStats::default()
            }
        }
    }
}

async fn run(remote: Arc<dyn RemoteApi>, mut rx: mpsc::UnboundedReceiver<Job>) -> SyncStats {
    tracing::info!("sync worker started");
    let mut stats = SyncStats::default();

    while let Some(job) = rx.recv().await {
        match job {
            Job::Push(change) => match push(remote.as_ref(), &change).await {
                Ok(()) => {
                    stats.pushed += 1;
                    tracing::debug!(
                        collection = %change.collection(),
                        id = %change.id(),
                        verb = change.verb(),
                        "change pushed"
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(
                        collection = %change.collection(),
                        id = %change.id(),
                        verb = change.verb(),
                        error = %e,
                        "remote sync failed, change dropped"
                    );
                }
            },
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::info!(pushed = stats.pushed, failed = stats.failed, "sync worker stopped");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use nexus_core::RecordId;
    use nexus_infra::Collection;
    use serde_json::{Value, json};

    use crate::remote::SyncError;

    /// Records calls; fails every call whose id starts with `bad`.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn log(&self, call: String, id: &str) -> Result<(), SyncError> {
            self.calls.lock().unwrap().push(call);
            if id.starts_with("bad") {
                Err(SyncError::Api(500, "boom".to_string()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl RemoteApi for Recorder {
        async fn list(&self, _collection: Collection) -> Result<Value, SyncError> {
            Ok(json!([]))
        }

        async fn create(&self, collection: Collection, record: &Value) -> Result<(), SyncError> {
            let id = record["id"].as_str().unwrap_or_default().to_string();
            self.log(format!("POST /{collection} {id}"), &id)
        }

        async fn update(&self, collection: Collection, id: &RecordId, _record: &Value) -> Result<(), SyncError> {
            self.log(format!("PUT /{collection}/{id}"), id.as_str())
        }

        async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), SyncError> {
            self.log(format!("DELETE /{collection}/{id}"), id.as_str())
        }
    }

    fn id(s: &str) -> RecordId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn changes_are_pushed_in_order_and_failures_dropped() {
        let remote = Arc::new(Recorder::default());
        let queue = SyncQueue::spawn(remote.clone());
        let handle = queue.handle();

        handle.record(Change::Created {
            collection: Collection::Clients,
            id: id("c1"),
            record: json!({"id": "c1"}),
        });
        handle.record(Change::Updated {
            collection: Collection::Ledger,
            id: id("bad-1"),
            record: json!({"id": "bad-1"}),
        });
        handle.record(Change::Deleted {
            collection: Collection::Invoices,
            id: id("i1"),
        });
        handle.flush().await;

        assert_eq!(
            remote.calls(),
            vec!["POST /clients c1", "PUT /ledger/bad-1", "DELETE /invoices/i1"]
        );

        drop(handle);
        let stats = queue.shutdown().await;
        assert_eq!(stats, SyncStats { pushed: 2, failed: 1 });
    }

    #[tokio::test]
    async fn shutdown_waits_for_outstanding_handles() {
        let queue = SyncQueue::spawn(Arc::new(Recorder::default()));
        let stray = queue.handle();

        let worker = tokio::spawn(queue.shutdown());
        stray.record(Change::Deleted {
            collection: Collection::Quotes,
            id: id("q1"),
        });
        drop(stray);

        let stats = worker.await.unwrap();
        assert_eq!(stats, SyncStats { pushed: 1, failed: 0 });
    }
}
