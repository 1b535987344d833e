//! Pod share controller.
//!
//! Pod events from the informer are filtered by [`enqueue::Enqueuer`] into a rate
//! limited work queue, and a fixed pool of workers drains it through
//! [`sync::Reconciler`]. The queue never hands the same key to two workers at once.
//!
//! Deleted pods reach the reconciler as terminating pods, the cache keeps their last
//! state until the teardown pass has released them.
pub mod directive;
pub mod enqueue;
pub mod sync;

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use libworkqueue::{RateLimitingQueue, default_controller_rate_limiter};
use log::{debug, error, info};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::informer::{PodEvent, PodLister};
pub use directive::ShareDirective;
pub use enqueue::Enqueuer;
pub use sync::{Reconciler, SyncError};

pub struct Controller {
    lister: Arc<dyn PodLister>,
    queue: Arc<RateLimitingQueue<String>>,
    reconciler: Arc<Reconciler>,
    events: UnboundedReceiver<PodEvent>,
    share_label: String,
}

impl Controller {
    /// Must be called inside a tokio runtime.
    pub fn new(
        lister: Arc<dyn PodLister>,
        reconciler: Reconciler,
        events: UnboundedReceiver<PodEvent>,
        share_label: impl Into<String>,
    ) -> Self {
        Self {
            lister,
            queue: Arc::new(RateLimitingQueue::new(default_controller_rate_limiter())),
            reconciler: Arc::new(reconciler),
            events,
            share_label: share_label.into(),
        }
    }

    pub fn queue(&self) -> Arc<RateLimitingQueue<String>> {
        self.queue.clone()
    }

    /// Start enqueueing, wait for the pod cache to sync, then run `workers` workers
    /// until `cancel` fires. Returns once every worker has finished its current key.
    pub async fn run(self, workers: usize, cancel: CancellationToken) -> anyhow::Result<()> {
        let Controller {
            lister,
            queue,
            reconciler,
            events,
            share_label,
        } = self;

        info!("Starting nfs share controller");
        let enqueuer = Enqueuer::new(share_label, queue.clone(), lister.clone());
        let enqueuer_handle = tokio::spawn(enqueuer.run(events, cancel.clone()));

        info!("Waiting for pod cache to sync");
        if !wait_for_cache_sync(lister.as_ref(), &cancel).await {
            queue.shut_down().await;
            join_logged("enqueuer", enqueuer_handle).await;
            return Err(anyhow!("failed to wait for pod cache to sync"));
        }

        info!("Starting {workers} workers");
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let queue = queue.clone();
            let reconciler = reconciler.clone();
            handles.push(tokio::spawn(async move {
                while process_next_work_item(&queue, &reconciler).await {}
                debug!("worker {id} stopped");
            }));
        }
        info!("Started workers");

        cancel.cancelled().await;
        info!("Shutting down workers");
        queue.shut_down().await;
        for handle in handles {
            join_logged("worker", handle).await;
        }
        join_logged("enqueuer", enqueuer_handle).await;
        Ok(())
    }
}

/// Wait for a spawned task. `false` if it panicked or was aborted.
async fn join_logged(what: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            error!("{what} panicked: {e}");
            false
        }
    }
}

/// Poll `has_synced` every 100ms. `false` if `cancel` fired first.
async fn wait_for_cache_sync(lister: &dyn PodLister, cancel: &CancellationToken) -> bool {
    loop {
        if lister.has_synced() {
            return true;
        }
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
    }
}

/// Take one key off the queue and reconcile it. `false` once the queue is shut down
/// and drained.
pub async fn process_next_work_item(
    queue: &RateLimitingQueue<String>,
    reconciler: &Reconciler,
) -> bool {
    let Some(key) = queue.get().await else {
        return false;
    };

    match reconciler.sync(&key).await {
        Ok(()) => {
            queue.forget(&key).await;
            info!("Successfully synced '{key}'");
        }
        Err(e) if e.is_retryable() => {
            error!("error syncing '{key}': {e}, requeuing");
            queue.add_rate_limited(key.clone()).await;
        }
        Err(e) => {
            error!("dropping '{key}': {e}");
            queue.forget(&key).await;
        }
    }
    queue.done(&key).await;
    true
}
