use std::sync::Arc;

use common::PodTask;
use libworkqueue::RateLimitingQueue;
use log::{debug, error};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use crate::informer::{KeyError, PodEvent, PodLister, deletion_handling_key, meta_namespace_key};

/// Turns pod events into work queue keys, keeping only pods that carry the share label.
///
/// A deleted pod without the label has nothing to tear down, its retained state is
/// released right away.
pub struct Enqueuer {
    share_label: String,
    queue: Arc<RateLimitingQueue<String>>,
    lister: Arc<dyn PodLister>,
}

impl Enqueuer {
    pub fn new(
        share_label: impl Into<String>,
        queue: Arc<RateLimitingQueue<String>>,
        lister: Arc<dyn PodLister>,
    ) -> Self {
        Self {
            share_label: share_label.into(),
            queue,
            lister,
        }
    }

    fn is_shared(&self, pod: &PodTask) -> bool {
        pod.metadata.labels.contains_key(&self.share_label)
    }

    async fn enqueue(&self, key: Result<String, KeyError>) {
        match key {
            Ok(key) => {
                debug!("enqueue {key}");
                self.queue.add_rate_limited(key).await;
            }
            Err(e) => error!("Failed to get key of pod: {e}"),
        }
    }

    pub async fn handle(&self, event: PodEvent) {
        match event {
            PodEvent::Added(pod) => {
                if self.is_shared(&pod) {
                    self.enqueue(meta_namespace_key(&pod)).await;
                }
            }
            PodEvent::Updated(old, new) => {
                // Same revision means nothing changed on the store.
                if old.metadata.resource_version == new.metadata.resource_version {
                    return;
                }
                if self.is_shared(&new) {
                    self.enqueue(meta_namespace_key(&new)).await;
                }
            }
            PodEvent::Deleted(deleted) => {
                if self.is_shared(deleted.pod()) {
                    self.enqueue(deletion_handling_key(&deleted)).await;
                } else {
                    let meta = &deleted.pod().metadata;
                    self.lister
                        .release_deleted(&meta.namespace, &meta.name)
                        .await;
                }
            }
        }
    }

    /// Consume events until the informer goes away or `cancel` fires.
    pub async fn run(self, mut events: UnboundedReceiver<PodEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
            }
        }
        debug!("enqueuer stopped");
    }
}
