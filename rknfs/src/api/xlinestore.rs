use anyhow::{Context, Result};
use common::{Event, PersistentVolumeClaim, PodTask};
use etcd_client::{
    Client, ConnectOptions, GetOptions, PutOptions, WatchOptions, WatchStream, Watcher,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::XlineConfig;

pub const PODS_PREFIX: &str = "/registry/pods/";
pub const CLAIMS_PREFIX: &str = "/registry/persistentvolumeclaims/";
pub const EVENTS_PREFIX: &str = "/registry/events/";

/// like etcd, k:/registry/pods/pod_name v:yaml file of pod
/// k:/registry/persistentvolumeclaims/namespace/claim_name v:yaml file of claim
/// k:/registry/events/namespace/event_name v:yaml file of event
#[derive(Clone)]
pub struct XlineStore {
    client: Arc<RwLock<Client>>,
}

/// Decode a pod stored under `/registry/pods/`, stamping it with the revision it was
/// last modified at.
pub fn decode_pod(value: &[u8], mod_revision: i64) -> Result<PodTask> {
    let mut pod: PodTask = serde_yaml::from_slice(value).context("Failed to parse pod yaml")?;
    pod.metadata.resource_version = mod_revision.to_string();
    Ok(pod)
}

impl XlineStore {
    pub async fn new(cfg: &XlineConfig) -> Result<Self> {
        let opts = if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
            ConnectOptions::default().with_user(user.clone(), pass.clone())
        } else {
            ConnectOptions::default()
        };
        let client = Client::connect(cfg.endpoints.clone(), Some(opts))
            .await
            .with_context(|| format!("Failed to connect xline at {:?}", cfg.endpoints))?;
        Ok(Self {
            client: Arc::new(RwLock::new(client)),
        })
    }

    pub async fn insert_pod_yaml(&self, pod_name: &str, pod_yaml: &str) -> Result<()> {
        let key = format!("{PODS_PREFIX}{pod_name}");
        let mut client = self.client.write().await;
        client.put(key, pod_yaml, Some(PutOptions::new())).await?;
        Ok(())
    }

    pub async fn get_pod(&self, pod_name: &str) -> Result<Option<PodTask>> {
        let key = format!("{PODS_PREFIX}{pod_name}");
        let mut client = self.client.write().await;
        let resp = client.get(key, None).await?;
        match resp.kvs().first() {
            Some(kv) => Ok(Some(decode_pod(kv.value(), kv.mod_revision())?)),
            None => Ok(None),
        }
    }

    pub async fn delete_pod(&self, pod_name: &str) -> Result<()> {
        let key = format!("{PODS_PREFIX}{pod_name}");
        let mut client = self.client.write().await;
        client.delete(key, None).await?;
        Ok(())
    }

    /// Snapshot of `/registry/pods/` as `(key, yaml, mod_revision)` plus the store
    /// revision the snapshot was read at.
    pub async fn pods_snapshot_with_rev(&self) -> Result<(Vec<(String, Vec<u8>, i64)>, i64)> {
        let mut client = self.client.write().await;
        let resp = client
            .get(PODS_PREFIX, Some(GetOptions::new().with_prefix()))
            .await?;
        let rev = resp.header().map(|h| h.revision()).unwrap_or(0);
        let items = resp
            .kvs()
            .iter()
            .map(|kv| {
                (
                    String::from_utf8_lossy(kv.key()).to_string(),
                    kv.value().to_vec(),
                    kv.mod_revision(),
                )
            })
            .collect();
        Ok((items, rev))
    }

    /// Prefix watch on pods with prev_kv, starting at `start_rev`.
    pub async fn watch_pods(&self, start_rev: i64) -> Result<(Watcher, WatchStream)> {
        let opts = WatchOptions::new()
            .with_prefix()
            .with_prev_key()
            .with_start_revision(start_rev);
        let mut client = self.client.write().await;
        let (watcher, stream) = client.watch(PODS_PREFIX, Some(opts)).await?;
        Ok((watcher, stream))
    }

    pub async fn insert_claim_yaml(
        &self,
        namespace: &str,
        claim_name: &str,
        claim_yaml: &str,
    ) -> Result<()> {
        let key = format!("{CLAIMS_PREFIX}{namespace}/{claim_name}");
        let mut client = self.client.write().await;
        client.put(key, claim_yaml, Some(PutOptions::new())).await?;
        Ok(())
    }

    pub async fn get_claim(
        &self,
        namespace: &str,
        claim_name: &str,
    ) -> Result<Option<PersistentVolumeClaim>> {
        let key = format!("{CLAIMS_PREFIX}{namespace}/{claim_name}");
        let mut client = self.client.write().await;
        let resp = client.get(key, None).await?;
        match resp.kvs().first() {
            Some(kv) => {
                let claim = serde_yaml::from_slice(kv.value())
                    .with_context(|| format!("Failed to parse claim {namespace}/{claim_name}"))?;
                Ok(Some(claim))
            }
            None => Ok(None),
        }
    }

    pub async fn put_event(&self, event: &Event) -> Result<()> {
        let key = format!(
            "{EVENTS_PREFIX}{}/{}",
            event.metadata.namespace, event.metadata.name
        );
        let yaml = serde_yaml::to_string(event)?;
        let mut client = self.client.write().await;
        client.put(key, yaml, Some(PutOptions::new())).await?;
        Ok(())
    }

    pub async fn list_events(&self, namespace: &str) -> Result<Vec<Event>> {
        let key = format!("{EVENTS_PREFIX}{namespace}/");
        let mut client = self.client.write().await;
        let resp = client.get(key, Some(GetOptions::new().with_prefix())).await?;
        resp.kvs()
            .iter()
            .map(|kv| serde_yaml::from_slice(kv.value()).context("Failed to parse event yaml"))
            .collect()
    }
}
