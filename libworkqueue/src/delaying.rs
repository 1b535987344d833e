use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::{Queue, QueueKey};

struct Waiting<K> {
    key: K,
    ready_at: Instant,
}

impl<K> PartialEq for Waiting<K> {
    fn eq(&self, other: &Self) -> bool {
        self.ready_at == other.ready_at
    }
}

impl<K> Eq for Waiting<K> {}

impl<K> PartialOrd for Waiting<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Waiting<K> {
    // BinaryHeap is a max-heap, the earliest deadline has to compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other.ready_at.cmp(&self.ready_at)
    }
}

/// A [`Queue`] whose keys can be scheduled to show up later.
///
/// Waiting keys live in a background task, so the queue must be created inside a
/// tokio runtime. The task stops when the queue is shut down.
pub struct DelayingQueue<K> {
    queue: Arc<Queue<K>>,
    waiting_tx: UnboundedSender<Waiting<K>>,
    stop: CancellationToken,
}

impl<K: QueueKey> Default for DelayingQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: QueueKey> DelayingQueue<K> {
    pub fn new() -> Self {
        let queue = Arc::new(Queue::new());
        let (waiting_tx, waiting_rx) = unbounded_channel();
        let stop = CancellationToken::new();
        tokio::spawn(Self::waiting_loop(queue.clone(), waiting_rx, stop.clone()));
        Self {
            queue,
            waiting_tx,
            stop,
        }
    }

    pub async fn add(&self, key: K) {
        self.queue.add(key).await;
    }

    /// Add `key` once `delay` has elapsed. A zero delay adds immediately.
    pub async fn add_after(&self, key: K, delay: Duration) {
        if self.queue.shutting_down().await {
            return;
        }
        if delay.is_zero() {
            self.queue.add(key).await;
            return;
        }
        let waiting = Waiting {
            key,
            ready_at: Instant::now() + delay,
        };
        if self.waiting_tx.send(waiting).is_err() {
            debug!("delaying queue stopped, dropping delayed key");
        }
    }

    pub async fn get(&self) -> Option<K> {
        self.queue.get().await
    }

    pub async fn done(&self, key: &K) {
        self.queue.done(key).await;
    }

    pub async fn len(&self) -> usize {
        self.queue.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.is_empty().await
    }

    pub async fn shut_down(&self) {
        self.stop.cancel();
        self.queue.shut_down().await;
    }

    pub async fn shutting_down(&self) -> bool {
        self.queue.shutting_down().await
    }

    /// Moves waiting keys into the queue once they are ready.
    ///
    /// A key that is already waiting keeps the earlier of its two deadlines, stale
    /// heap entries are skipped when they surface.
    async fn waiting_loop(
        queue: Arc<Queue<K>>,
        mut waiting_rx: UnboundedReceiver<Waiting<K>>,
        stop: CancellationToken,
    ) {
        let mut heap: BinaryHeap<Waiting<K>> = BinaryHeap::new();
        let mut deadlines: HashMap<K, Instant> = HashMap::new();

        loop {
            let now = Instant::now();
            while heap.peek().is_some_and(|w| w.ready_at <= now) {
                let Some(entry) = heap.pop() else { break };
                if deadlines.get(&entry.key) == Some(&entry.ready_at) {
                    deadlines.remove(&entry.key);
                    queue.add(entry.key).await;
                }
            }

            let next = heap.peek().map(|w| w.ready_at);
            tokio::select! {
                _ = stop.cancelled() => return,
                _ = async {
                    match next {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {}
                incoming = waiting_rx.recv() => {
                    let Some(entry) = incoming else { return };
                    match deadlines.get(&entry.key) {
                        Some(existing) if *existing <= entry.ready_at => {}
                        _ => {
                            deadlines.insert(entry.key.clone(), entry.ready_at);
                            heap.push(entry);
                        }
                    }
                }
            }
        }
    }
}

impl<K> Drop for DelayingQueue<K> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
