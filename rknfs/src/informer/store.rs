use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::PodTask;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum KeyError {
    #[error("object has no name")]
    MissingName,
    #[error("unexpected key format: {0:?}")]
    InvalidFormat(String),
}

/// `namespace/name`, or just `name` for objects without a namespace.
pub fn meta_namespace_key(pod: &PodTask) -> Result<String, KeyError> {
    let meta = &pod.metadata;
    if meta.name.is_empty() {
        return Err(KeyError::MissingName);
    }
    if meta.namespace.is_empty() {
        Ok(meta.name.clone())
    } else {
        Ok(format!("{}/{}", meta.namespace, meta.name))
    }
}

/// Inverse of [`meta_namespace_key`], returns `(namespace, name)`.
pub fn split_meta_namespace_key(key: &str) -> Result<(String, String), KeyError> {
    let parts: Vec<&str> = key.split('/').collect();
    match parts.as_slice() {
        [name] if !name.is_empty() => Ok((String::new(), name.to_string())),
        [namespace, name] if !name.is_empty() => Ok((namespace.to_string(), name.to_string())),
        _ => Err(KeyError::InvalidFormat(key.to_string())),
    }
}

/// Read access to the last known pod states.
#[async_trait]
pub trait PodLister: Send + Sync {
    async fn get_by_key(&self, namespace: &str, name: &str) -> anyhow::Result<Option<PodTask>>;

    /// Whether the initial listing has been loaded.
    fn has_synced(&self) -> bool;

    /// Forget a deleted pod once its teardown has run. Live pods are left alone.
    async fn release_deleted(&self, _namespace: &str, _name: &str) {}
}

#[derive(Default)]
struct CacheState {
    /// `namespace/name` -> pod
    pods: HashMap<String, PodTask>,
    /// store key -> `namespace/name`
    keys: HashMap<String, String>,
    /// `namespace/name` -> last state of a deleted pod, kept until its teardown ran
    deleted: HashMap<String, PodTask>,
}

/// Pods as last seen on the store, indexed by `namespace/name`.
///
/// The store drops pods outright, so a deleted pod stays readable as terminating
/// (`deletion_timestamp` set) until [`PodLister::release_deleted`] is called for it.
/// Only the informer adds or removes pods, everyone else reads through [`PodLister`].
#[derive(Default)]
pub struct PodCache {
    state: RwLock<CacheState>,
    synced: AtomicBool,
}

impl PodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `pod` under `store_key`, returning the state it replaced.
    pub async fn upsert(
        &self,
        store_key: &str,
        pod: PodTask,
    ) -> Result<Option<PodTask>, KeyError> {
        let key = meta_namespace_key(&pod)?;
        let mut state = self.state.write().await;
        // A pod recreated under the same name replaces its predecessor's remains.
        state.deleted.remove(&key);
        let moved = match state.keys.insert(store_key.to_string(), key.clone()) {
            Some(old_key) if old_key != key => state.pods.remove(&old_key),
            _ => None,
        };
        let previous = state.pods.insert(key, pod);
        Ok(previous.or(moved))
    }

    /// Take the pod stored under `store_key` out of the live set and keep its last
    /// state, marked as terminating, for the final teardown. `last_known` stands in
    /// when the cache never saw the pod. Returns the key and the retained state.
    pub async fn mark_deleted(
        &self,
        store_key: &str,
        last_known: Option<PodTask>,
    ) -> Option<(String, PodTask)> {
        let mut state = self.state.write().await;
        let cached = match state.keys.remove(store_key) {
            Some(key) => state.pods.remove(&key),
            None => None,
        };
        let mut pod = cached.or(last_known)?;
        let key = meta_namespace_key(&pod).ok()?;
        pod.metadata.deletion_timestamp.get_or_insert_with(Utc::now);
        state.deleted.insert(key.clone(), pod.clone());
        Some((key, pod))
    }

    /// Deleted pods still waiting for their teardown.
    pub async fn pending_deletions(&self) -> usize {
        self.state.read().await.deleted.len()
    }

    pub async fn store_keys(&self) -> Vec<String> {
        self.state.read().await.keys.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.pods.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn mark_synced(&self) {
        self.synced.store(true, Ordering::Release);
    }
}

#[async_trait]
impl PodLister for PodCache {
    async fn get_by_key(&self, namespace: &str, name: &str) -> anyhow::Result<Option<PodTask>> {
        let key = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}/{name}")
        };
        let state = self.state.read().await;
        Ok(state.pods.get(&key).or_else(|| state.deleted.get(&key)).cloned())
    }

    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    async fn release_deleted(&self, namespace: &str, name: &str) {
        let key = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}/{name}")
        };
        self.state.write().await.deleted.remove(&key);
    }
}
