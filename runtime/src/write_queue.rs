//! Latest-wins persistence queue.
//!
//! A [`WriteQueue`] owns one background worker that writes string blobs to a
//! single key of a [`KeyValueStore`]. Callers enqueue the newest serialized
//! state and move on; they never wait for storage.
//!
//! # Guarantees
//!
//! - At most one write is in flight at any time.
//! - A value enqueued while a write is running replaces any value still
//!   waiting, so only the newest state is written next.
//! - Writes therefore complete in enqueue order and a stale value can never
//!   overwrite a newer one.
//! - A failed write is logged and counted, never retried. The next
//!   successful write replaces the whole record.
//!
//! # Example
//!
//! ```ignore
//! let queue = WriteQueue::spawn(storage, "todoItems");
//! queue.enqueue(serde_json::to_string(&todos)?);
//! queue.flush().await?;
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taskpad_core::storage::KeyValueStore;
use thiserror::Error;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

/// Errors reported by [`WriteQueue`] when waiting on the worker.
#[derive(Error, Debug)]
pub enum WriteQueueError {
    /// The worker stopped before settling the requested writes.
    #[error("Write queue worker stopped")]
    WorkerStopped,
}

#[derive(Debug, Default)]
struct Slot {
    /// Revision of the most recent `enqueue`
    latest: u64,
    /// Value waiting to be written, tagged with its revision
    pending: Option<(u64, String)>,
    closed: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Notify,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        // The slot holds plain data, so a poisoned lock is still consistent
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background writer for one storage key.
pub struct WriteQueue {
    key: String,
    shared: Arc<Shared>,
    settled: watch::Receiver<u64>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WriteQueue {
    /// Start the worker task for `key`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            wake: Notify::new(),
        });
        let (settled_tx, settled) = watch::channel(0);

        let worker = tokio::spawn(run_worker(
            storage,
            key.clone(),
            Arc::clone(&shared),
            settled_tx,
        ));

        Self {
            key,
            shared,
            settled,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Storage key this queue writes to
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue `value` as the next state to persist and return its revision.
    ///
    /// Any value still waiting is discarded. Values enqueued after
    /// [`close`](Self::close) are ignored.
    pub fn enqueue(&self, value: String) -> u64 {
        let revision = {
            let mut slot = self.shared.slot();
            if slot.closed {
                tracing::warn!(key = %self.key, "Ignoring write enqueued after close");
                return slot.latest;
            }
            slot.latest += 1;
            let revision = slot.latest;
            if let Some((superseded, _)) = slot.pending.replace((revision, value)) {
                tracing::trace!(key = %self.key, superseded, revision, "Superseded pending write");
                metrics::counter!("persistence.writes.superseded").increment(1);
            }
            revision
        };

        self.shared.wake.notify_one();
        revision
    }

    /// Revision of the newest write that has finished (successfully or not)
    #[must_use]
    pub fn settled_revision(&self) -> u64 {
        *self.settled.borrow()
    }

    /// Wait until every value enqueued so far has been written or has failed.
    ///
    /// # Errors
    ///
    /// Returns [`WriteQueueError::WorkerStopped`] if the worker exited first.
    pub async fn flush(&self) -> Result<(), WriteQueueError> {
        let target = self.shared.slot().latest;
        let mut settled = self.settled.clone();
        settled
            .wait_for(|revision| *revision >= target)
            .await
            .map(|_| ())
            .map_err(|_| WriteQueueError::WorkerStopped)
    }

    /// Flush outstanding writes and stop the worker.
    ///
    /// # Errors
    ///
    /// Returns [`WriteQueueError::WorkerStopped`] if the worker had already
    /// stopped with writes outstanding.
    pub async fn close(&self) -> Result<(), WriteQueueError> {
        self.shared.slot().closed = true;
        self.shared.wake.notify_one();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if let Err(error) = worker.await {
                tracing::error!(key = %self.key, %error, "Write queue worker failed");
                return Err(WriteQueueError::WorkerStopped);
            }
        }

        let latest = self.shared.slot().latest;
        if self.settled_revision() < latest {
            return Err(WriteQueueError::WorkerStopped);
        }
        Ok(())
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        // Let a detached worker drain the last value and exit
        self.shared.slot().closed = true;
        self.shared.wake.notify_one();
    }
}

impl std::fmt::Debug for WriteQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteQueue")
            .field("key", &self.key)
            .field("settled_revision", &self.settled_revision())
            .finish_non_exhaustive()
    }
}

async fn run_worker(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    shared: Arc<Shared>,
    settled: watch::Sender<u64>,
) {
    tracing::debug!(%key, "Write queue worker started");

    loop {
        let (next, closed) = {
            let mut slot = shared.slot();
            (slot.pending.take(), slot.closed)
        };

        match next {
            Some((revision, value)) => {
                write_once(storage.as_ref(), &key, revision, value).await;
                settled.send_replace(revision);
            },
            None if closed => break,
            None => shared.wake.notified().await,
        }
    }

    tracing::debug!(%key, "Write queue worker stopped");
}

#[tracing::instrument(skip(storage, value), fields(bytes = value.len()))]
async fn write_once(storage: &dyn KeyValueStore, key: &str, revision: u64, value: String) {
    let start = std::time::Instant::now();
    metrics::counter!("persistence.writes.total").increment(1);

    match storage.set_item(key, value).await {
        Ok(()) => {
            tracing::debug!("Persisted state");
        },
        Err(error) => {
            metrics::counter!("persistence.writes.failed").increment(1);
            tracing::warn!(%error, "Failed to persist state; keeping previous record");
        },
    }

    metrics::histogram!("persistence.write.duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
