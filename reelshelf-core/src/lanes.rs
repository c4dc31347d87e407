//! Per-key sequential execution lanes.
//!
//! Every key gets its own worker task draining an unbounded queue, so
//! operations on the same key run one at a time in submission order while
//! different keys proceed concurrently. Submission is synchronous: the slot
//! in the queue is taken when [`Lanes::submit`] is called, not when the
//! returned receiver is first polled.
//!
//! A worker whose queue runs dry removes its own entry and exits, so idle
//! keys hold no task. The next submission for that key starts a new one.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::BoxFuture;
use tokio::sync::mpsc::error::{SendError, TryRecvError};
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

type LaneJob = BoxFuture<'static, ()>;

struct Lane {
    /// Distinguishes a replacement lane from the one a worker was started for
    generation: u64,
    tx: mpsc::UnboundedSender<LaneJob>,
}

pub(crate) struct Lanes<K>
where
    K: Eq + Hash,
{
    lanes: Arc<DashMap<K, Lane>>,
    generations: AtomicU64,
}

impl<K> fmt::Debug for Lanes<K>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lanes")
            .field("active", &self.lanes.len())
            .finish()
    }
}

impl<K> Default for Lanes<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            lanes: Arc::new(DashMap::new()),
            generations: AtomicU64::new(0),
        }
    }
}

impl<K> Lanes<K>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static,
{
    /// Queue `op` behind every operation previously submitted for `key`.
    ///
    /// Must be called from within a Tokio runtime; the first submission for
    /// an idle key spawns its worker.
    pub(crate) fn submit<F, T>(&self, key: &K, op: F) -> oneshot::Receiver<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: LaneJob = Box::pin(async move {
            let _ = reply_tx.send(op.await);
        });

        // Sends happen while the entry is locked, so a worker can never
        // evict itself between the queue check and the send. A send only
        // fails when the worker died with a panicking job; the dead lane is
        // then replaced.
        match self.lanes.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if let Err(SendError(rejected)) = occupied.get().tx.send(job) {
                    trace!(lane = %key, "replacing dead lane");
                    let lane = self.spawn_lane(key.clone());
                    let _ = lane.tx.send(rejected);
                    occupied.insert(lane);
                }
            }
            Entry::Vacant(vacant) => {
                let lane = self.spawn_lane(key.clone());
                let _ = lane.tx.send(job);
                vacant.insert(lane);
            }
        }
        reply_rx
    }

    /// Number of keys that currently own a worker
    pub(crate) fn active(&self) -> usize {
        self.lanes.len()
    }

    fn spawn_lane(&self, key: K) -> Lane {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let (tx, mut rx) = mpsc::unbounded_channel::<LaneJob>();
        let lanes = Arc::clone(&self.lanes);

        tokio::spawn(async move {
            trace!(lane = %key, generation, "lane started");
            loop {
                match rx.try_recv() {
                    Ok(job) => {
                        job.await;
                        continue;
                    }
                    Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                let evicted = lanes
                    .remove_if(&key, |_, lane| {
                        lane.generation == generation && rx.is_empty()
                    })
                    .is_some();
                if evicted {
                    break;
                }

                // Either a job raced in before the lock or the entry is not
                // inserted yet; wait for the next job.
                match rx.recv().await {
                    Some(job) => job.await,
                    None => break,
                }
            }
            trace!(lane = %key, generation, "lane drained");
        });

        Lane { generation, tx }
    }
}
