use std::collections::{HashSet, VecDeque};

use tokio::sync::{Mutex, Notify};

use crate::QueueKey;

struct QueueState<K> {
    /// Keys waiting to be handed out, in insertion order.
    queue: VecDeque<K>,
    /// Keys that need processing. A key can be dirty while it is processing,
    /// it goes back to `queue` when `done` is called.
    dirty: HashSet<K>,
    /// Keys handed out by `get` and not yet released by `done`.
    processing: HashSet<K>,
    shutting_down: bool,
}

/// FIFO queue with per-key deduplication.
///
/// # Note
/// - A key is never stored twice, adding an already queued key is a no-op.
/// - A key is never handed to two consumers at the same time. If it is added while
///   being processed it is re-queued when the consumer calls [`Queue::done`].
pub struct Queue<K> {
    state: Mutex<QueueState<K>>,
    cond: Notify,
}

impl<K: QueueKey> Default for Queue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: QueueKey> Queue<K> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                dirty: HashSet::new(),
                processing: HashSet::new(),
                shutting_down: false,
            }),
            cond: Notify::new(),
        }
    }

    /// Mark a key as needing processing. Ignored once the queue is shutting down.
    pub async fn add(&self, key: K) {
        let mut state = self.state.lock().await;
        if state.shutting_down || state.dirty.contains(&key) {
            return;
        }
        state.dirty.insert(key.clone());
        if state.processing.contains(&key) {
            return;
        }
        state.queue.push_back(key);
        drop(state);
        self.cond.notify_one();
    }

    /// Number of keys waiting to be handed out.
    pub async fn len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Wait for the next key.
    ///
    /// Returns `None` once the queue is shut down and drained. Every `Some(key)` must be
    /// paired with exactly one [`Queue::done`].
    pub async fn get(&self) -> Option<K> {
        loop {
            // Register interest before looking at the state so a concurrent
            // `add` or `shut_down` cannot slip between the check and the wait.
            let notified = self.cond.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if let Some(key) = state.queue.pop_front() {
                    state.processing.insert(key.clone());
                    state.dirty.remove(&key);
                    return Some(key);
                }
                if state.shutting_down {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Release a key handed out by [`Queue::get`].
    pub async fn done(&self, key: &K) {
        let mut state = self.state.lock().await;
        state.processing.remove(key);
        if state.dirty.contains(key) {
            state.queue.push_back(key.clone());
            drop(state);
            self.cond.notify_one();
        }
    }

    /// Stop accepting new keys and wake every waiting consumer.
    pub async fn shut_down(&self) {
        self.state.lock().await.shutting_down = true;
        self.cond.notify_waiters();
    }

    pub async fn shutting_down(&self) -> bool {
        self.state.lock().await.shutting_down
    }
}
