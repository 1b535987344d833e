//! Work queues for controllers.
//!
//! The building blocks stack on each other:
//! - [`Queue`]: FIFO that never holds the same key twice and never hands out a key
//!   that is still being processed.
//! - [`DelayingQueue`]: adds `add_after` on top of [`Queue`].
//! - [`RateLimitingQueue`]: adds per-key backoff on top of [`DelayingQueue`].
//!
//! # Example
//! ```ignore
//! let queue = RateLimitingQueue::new(default_controller_rate_limiter());
//! queue.add("default/web".to_string()).await;
//! while let Some(key) = queue.get().await {
//!     match sync(&key).await {
//!         Ok(()) => queue.forget(&key).await,
//!         Err(_) => queue.add_rate_limited(key.clone()).await,
//!     }
//!     queue.done(&key).await;
//! }
//! ```
pub mod delaying;
pub mod queue;
pub mod rate_limiter;
pub mod rate_limiting;

pub use delaying::DelayingQueue;
pub use queue::Queue;
pub use rate_limiter::{
    BucketRateLimiter, ItemExponentialFailureRateLimiter, MaxOfRateLimiter, RateLimiter,
    default_controller_rate_limiter,
};
pub use rate_limiting::RateLimitingQueue;

/// Bound shared by every key type a queue can hold.
pub trait QueueKey: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static {}

impl<T> QueueKey for T where T: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static {}
