//! List + watch over the pod registry.
//!
//! [`PodInformer`] keeps a [`PodCache`] in step with `/registry/pods/` and tells its
//! subscribers what changed through [`PodEvent`]s. When the watch breaks it relists;
//! pods that disappeared in the meantime are reported as
//! [`DeletedPod::FinalStateUnknown`]. Deleted pods stay in the cache as terminating
//! until their teardown has run.
pub mod event;
pub mod store;

use std::collections::HashSet;
use std::sync::Arc;

use common::PodTask;
use etcd_client::{Event as WatchEvent, EventType};
use log::{debug, error, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

use crate::api::xlinestore::{XlineStore, decode_pod};
pub use event::{DeletedPod, PodEvent, deletion_handling_key};
pub use store::{KeyError, PodCache, PodLister, meta_namespace_key, split_meta_namespace_key};

/// One change read off the watch stream.
#[derive(Debug)]
pub enum Delta {
    Put {
        store_key: String,
        pod: PodTask,
    },
    Delete {
        store_key: String,
        /// State carried by the watch event itself (prev_kv), if any.
        last_known: Option<PodTask>,
    },
}

impl Delta {
    fn from_watch_event(event: &WatchEvent) -> Option<Self> {
        let kv = event.kv()?;
        let store_key = String::from_utf8_lossy(kv.key()).to_string();
        match event.event_type() {
            EventType::Put => match decode_pod(kv.value(), kv.mod_revision()) {
                Ok(pod) => Some(Delta::Put { store_key, pod }),
                Err(e) => {
                    warn!("Ignoring undecodable pod at {store_key}: {e:?}");
                    None
                }
            },
            EventType::Delete => {
                let last_known = event
                    .prev_kv()
                    .and_then(|prev| decode_pod(prev.value(), prev.mod_revision()).ok());
                Some(Delta::Delete {
                    store_key,
                    last_known,
                })
            }
        }
    }
}

/// Applies deltas and listings to the cache and fans the resulting events out.
pub struct Reflector {
    cache: Arc<PodCache>,
    subscribers: Vec<UnboundedSender<PodEvent>>,
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new()
    }
}

impl Reflector {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(PodCache::new()),
            subscribers: Vec::new(),
        }
    }

    pub fn cache(&self) -> Arc<PodCache> {
        self.cache.clone()
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<PodEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&self, event: PodEvent) {
        for subscriber in &self.subscribers {
            if subscriber.send(event.clone()).is_err() {
                debug!("pod event subscriber has gone away");
            }
        }
    }

    pub async fn apply(&self, delta: Delta) {
        match delta {
            Delta::Put { store_key, pod } => {
                match self.cache.upsert(&store_key, pod.clone()).await {
                    Ok(None) => self.notify(PodEvent::Added(Box::new(pod))),
                    Ok(Some(old)) => self.notify(PodEvent::Updated(Box::new(old), Box::new(pod))),
                    Err(e) => warn!("Ignoring pod at {store_key}: {e}"),
                }
            }
            Delta::Delete {
                store_key,
                last_known,
            } => {
                match self.cache.mark_deleted(&store_key, last_known).await {
                    Some((_, pod)) => {
                        self.notify(PodEvent::Deleted(DeletedPod::Known(Box::new(pod))))
                    }
                    None => debug!("delete of never observed pod {store_key}"),
                }
            }
        }
    }

    /// Swap the cache content for a fresh listing.
    pub async fn replace(&self, items: Vec<(String, PodTask)>) {
        let fresh: HashSet<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
        for store_key in self.cache.store_keys().await {
            if fresh.contains(store_key.as_str()) {
                continue;
            }
            if let Some((key, pod)) = self.cache.mark_deleted(&store_key, None).await {
                self.notify(PodEvent::Deleted(DeletedPod::FinalStateUnknown {
                    key,
                    pod: Box::new(pod),
                }));
            }
        }
        for (store_key, pod) in items {
            self.apply(Delta::Put { store_key, pod }).await;
        }
        self.cache.mark_synced();
    }
}

pub struct PodInformer {
    store: Arc<XlineStore>,
    reflector: Reflector,
}

impl PodInformer {
    pub fn new(store: Arc<XlineStore>) -> Self {
        Self {
            store,
            reflector: Reflector::new(),
        }
    }

    pub fn lister(&self) -> Arc<PodCache> {
        self.reflector.cache()
    }

    /// Must be called before [`PodInformer::run`], later subscribers miss the initial listing.
    pub fn subscribe(&mut self) -> UnboundedReceiver<PodEvent> {
        self.reflector.subscribe()
    }

    async fn list(&self) -> anyhow::Result<i64> {
        let (items, rev) = self.store.pods_snapshot_with_rev().await?;
        let mut pods = Vec::with_capacity(items.len());
        for (store_key, value, mod_revision) in items {
            match decode_pod(&value, mod_revision) {
                Ok(pod) => pods.push((store_key, pod)),
                Err(e) => warn!("Ignoring undecodable pod at {store_key}: {e:?}"),
            }
        }
        info!("listed {} pods at revision {rev}", pods.len());
        self.reflector.replace(pods).await;
        Ok(rev)
    }

    /// List, then watch from the listed revision. Relists with backoff whenever the watch
    /// fails, returns once `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut backoff = Duration::from_millis(100);
        let max_backoff = Duration::from_secs(5);

        loop {
            let listed = tokio::select! {
                _ = cancel.cancelled() => return,
                res = self.list() => res,
            };
            let watched = match listed {
                Ok(rev) => {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        res = self.store.watch_pods(rev + 1) => res,
                    }
                }
                Err(e) => Err(e),
            };

            match watched {
                Ok((_watcher, mut stream)) => {
                    backoff = Duration::from_millis(100);
                    loop {
                        let msg = tokio::select! {
                            _ = cancel.cancelled() => return,
                            msg = stream.message() => msg,
                        };
                        match msg {
                            Ok(Some(resp)) => {
                                if resp.canceled() {
                                    warn!("pod watch canceled by the store, relisting");
                                    break;
                                }
                                for event in resp.events() {
                                    if let Some(delta) = Delta::from_watch_event(event) {
                                        self.reflector.apply(delta).await;
                                    }
                                }
                            }
                            Ok(None) => {
                                warn!("pod watch stream closed, relisting");
                                break;
                            }
                            Err(e) => {
                                error!("pod watch stream error: {e}");
                                break;
                            }
                        }
                    }
                }
                Err(e) => error!("Failed to list and watch pods: {e:?}"),
            }

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = sleep(backoff) => {}
            }
            backoff = std::cmp::min(backoff * 2, max_backoff);
        }
    }
}
