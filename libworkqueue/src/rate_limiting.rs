use std::time::Duration;

use tokio::sync::Mutex;

use crate::{DelayingQueue, QueueKey, RateLimiter};

/// The queue controllers drive their workers with: dedup, delayed adds and per-key
/// backoff in one place.
pub struct RateLimitingQueue<K> {
    queue: DelayingQueue<K>,
    limiter: Mutex<Box<dyn RateLimiter<K>>>,
}

impl<K: QueueKey> RateLimitingQueue<K> {
    /// Must be called inside a tokio runtime.
    pub fn new(limiter: Box<dyn RateLimiter<K>>) -> Self {
        Self {
            queue: DelayingQueue::new(),
            limiter: Mutex::new(limiter),
        }
    }

    pub async fn add(&self, key: K) {
        self.queue.add(key).await;
    }

    pub async fn add_after(&self, key: K, delay: Duration) {
        self.queue.add_after(key, delay).await;
    }

    /// Add `key` after the delay the rate limiter assigns to it.
    pub async fn add_rate_limited(&self, key: K) {
        let delay = self.limiter.lock().await.when(&key);
        self.queue.add_after(key, delay).await;
    }

    /// Reset the backoff of `key`. Call it once the key was processed successfully or
    /// will never succeed.
    pub async fn forget(&self, key: &K) {
        self.limiter.lock().await.forget(key);
    }

    pub async fn num_requeues(&self, key: &K) -> usize {
        self.limiter.lock().await.num_requeues(key)
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
        self.queue.shut_down().await;
    }

    pub async fn shutting_down(&self) -> bool {
        self.queue.shutting_down().await
    }
}
