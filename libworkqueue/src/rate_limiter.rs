use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::QueueKey;

/// Decides how long a key has to wait before it is retried.
pub trait RateLimiter<K>: Send {
    /// Delay before `key` may be processed again. Each call counts as one failure.
    fn when(&mut self, key: &K) -> Duration;
    /// Stop tracking `key`, resetting its backoff.
    fn forget(&mut self, key: &K);
    /// How many times `key` has been requeued since it was last forgotten.
    fn num_requeues(&self, key: &K) -> usize;
}

/// Per-key exponential backoff: `base * 2^failures`, capped at `max`.
pub struct ItemExponentialFailureRateLimiter<K> {
    failures: HashMap<K, u32>,
    base: Duration,
    max: Duration,
}

impl<K: QueueKey> ItemExponentialFailureRateLimiter<K> {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            failures: HashMap::new(),
            base,
            max,
        }
    }
}

impl<K: QueueKey> RateLimiter<K> for ItemExponentialFailureRateLimiter<K> {
    fn when(&mut self, key: &K) -> Duration {
        let failures = self.failures.entry(key.clone()).or_insert(0);
        let exp = *failures;
        *failures = failures.saturating_add(1);

        2_u32
            .checked_pow(exp)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.max, |backoff| backoff.min(self.max))
    }

    fn forget(&mut self, key: &K) {
        self.failures.remove(key);
    }

    fn num_requeues(&self, key: &K) -> usize {
        self.failures.get(key).copied().unwrap_or(0) as usize
    }
}

/// Token bucket shared by every key, bounding the overall retry rate.
///
/// Tokens are reserved even when the bucket is empty, the caller simply waits for the
/// reservation to mature.
pub struct BucketRateLimiter {
    qps: f64,
    burst: f64,
    tokens: f64,
    last: Instant,
}

impl BucketRateLimiter {
    pub fn new(qps: f64, burst: usize) -> Self {
        Self {
            qps,
            burst: burst as f64,
            tokens: burst as f64,
            last: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.qps).min(self.burst);
        self.last = now;
    }
}

impl<K: QueueKey> RateLimiter<K> for BucketRateLimiter {
    fn when(&mut self, _key: &K) -> Duration {
        self.refill();
        self.tokens -= 1.0;
        if self.tokens >= 0.0 || self.qps <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(-self.tokens / self.qps)
    }

    fn forget(&mut self, _key: &K) {}

    fn num_requeues(&self, _key: &K) -> usize {
        0
    }
}

/// Combines several limiters and waits for the slowest of them.
pub struct MaxOfRateLimiter<K> {
    limiters: Vec<Box<dyn RateLimiter<K>>>,
}

impl<K: QueueKey> MaxOfRateLimiter<K> {
    pub fn new(limiters: Vec<Box<dyn RateLimiter<K>>>) -> Self {
        Self { limiters }
    }
}

impl<K: QueueKey> RateLimiter<K> for MaxOfRateLimiter<K> {
    fn when(&mut self, key: &K) -> Duration {
        self.limiters
            .iter_mut()
            .map(|l| l.when(key))
            .max()
            .unwrap_or(Duration::ZERO)
    }

    fn forget(&mut self, key: &K) {
        for l in self.limiters.iter_mut() {
            l.forget(key);
        }
    }

    fn num_requeues(&self, key: &K) -> usize {
        self.limiters
            .iter()
            .map(|l| l.num_requeues(key))
            .max()
            .unwrap_or(0)
    }
}

/// Per-key exponential backoff from 5ms up to 1000s, combined with an overall
/// 10 qps bucket that allows bursts of 100.
pub fn default_controller_rate_limiter<K: QueueKey>() -> Box<dyn RateLimiter<K>> {
    Box::new(MaxOfRateLimiter::new(vec![
        Box::new(ItemExponentialFailureRateLimiter::new(
            Duration::from_millis(5),
            Duration::from_secs(1000),
        )),
        Box::new(BucketRateLimiter::new(10.0, 100)),
    ]))
}
