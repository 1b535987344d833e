use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{EventType, PodTask};
use log::{debug, error, info, warn};

use crate::api::claims::ClaimResolver;
use crate::controller::directive::ShareDirective;
use crate::informer::{KeyError, PodLister, split_meta_namespace_key};
use crate::nfs::{NfsError, NfsServer};
use crate::record::EventRecorder;

/// Reason of the event recorded after a pod has been synced.
pub const SUCCESS_SYNCED: &str = "Synced";
pub const MESSAGE_RESOURCE_SYNCED: &str = "Add nfs share path success.";

/// Mounts carrying service account tokens are never shared.
const DEFAULT_TOKEN: &str = "default-token";

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("invalid resource key: {0}")]
    InvalidKey(#[from] KeyError),
    #[error("failed to read pod from cache: {0:#}")]
    Cache(anyhow::Error),
}

impl SyncError {
    /// Whether requeueing the key can make the next attempt succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Cache(_))
    }
}

/// Where the kubelet mounts a csi volume of a pod on the host.
pub fn host_volume_path(pods_root: &Path, pod_uid: &str, volume_name: &str) -> PathBuf {
    pods_root
        .join(pod_uid)
        .join("volumes")
        .join("kubernetes.io~csi")
        .join(volume_name)
        .join("mount")
}

/// Brings the mounts and exports of one pod in line with its share label.
pub struct Reconciler {
    lister: Arc<dyn PodLister>,
    claims: Arc<dyn ClaimResolver>,
    nfs: Arc<dyn NfsServer>,
    recorder: Arc<dyn EventRecorder>,
    pods_root: PathBuf,
    share_label: String,
}

impl Reconciler {
    pub fn new(
        lister: Arc<dyn PodLister>,
        claims: Arc<dyn ClaimResolver>,
        nfs: Arc<dyn NfsServer>,
        recorder: Arc<dyn EventRecorder>,
        pods_root: impl Into<PathBuf>,
        share_label: impl Into<String>,
    ) -> Self {
        Self {
            lister,
            claims,
            nfs,
            recorder,
            pods_root: pods_root.into(),
            share_label: share_label.into(),
        }
    }

    /// Reconcile the pod behind `key`.
    ///
    /// Only a malformed key or a failed cache read is an error. Failures on a single
    /// mount are logged and the pass moves on to the next mount. A deleted pod is
    /// released from the cache after its teardown pass.
    pub async fn sync(&self, key: &str) -> Result<(), SyncError> {
        let (namespace, name) = split_meta_namespace_key(key)?;
        let pod = match self
            .lister
            .get_by_key(&namespace, &name)
            .await
            .map_err(SyncError::Cache)?
        {
            Some(pod) => pod,
            None => {
                info!("pod '{key}' in work queue no longer exists");
                return Ok(());
            }
        };

        self.reconcile(key, &pod).await;
        if pod.is_terminating() {
            self.lister.release_deleted(&namespace, &name).await;
        }
        Ok(())
    }

    async fn reconcile(&self, key: &str, pod: &PodTask) {
        if !pod.is_running() {
            debug!("pod {key} is {:?}, skipping", pod.status.phase);
            return;
        }
        if pod.spec.volumes.is_empty() {
            debug!("pod {key} declares no volumes, skipping");
            return;
        }

        let directive = ShareDirective::from_pod(pod, &self.share_label);
        let terminating = pod.is_terminating();

        for container in &pod.spec.containers {
            for mount in &container.volume_mounts {
                if mount.name.contains(DEFAULT_TOKEN) {
                    continue;
                }
                let Some(host_path) = self.resolve_host_path(pod, &mount.name).await else {
                    continue;
                };

                let result = if directive.contains(&mount.name) && !terminating {
                    self.share(&host_path, &mount.mount_path).await
                } else {
                    self.unshare(&mount.mount_path).await
                };
                if let Err(e) = result {
                    error!(
                        "pod {key}: volume {} at {} left as is: {e}",
                        mount.name, mount.mount_path
                    );
                }
            }
        }

        if let Err(e) = self.nfs.refresh_exports().await {
            error!("pod {key}: failed to refresh exports: {e}");
        }
        self.recorder.event(
            &pod.object_reference(),
            EventType::Normal,
            SUCCESS_SYNCED,
            MESSAGE_RESOURCE_SYNCED,
        );
    }

    /// Host directory backing the pod volume `volume_name`, if it can be found on disk.
    async fn resolve_host_path(&self, pod: &PodTask, volume_name: &str) -> Option<PathBuf> {
        let pod_name = &pod.metadata.name;
        let Some(claim) = pod
            .volume(volume_name)
            .and_then(|volume| volume.persistent_volume_claim.as_ref())
        else {
            info!("pod {pod_name}: volume {volume_name} is not backed by a claim");
            return None;
        };

        let backing = match self
            .claims
            .backing_volume(&pod.metadata.namespace, &claim.claim_name)
            .await
        {
            Ok(Some(backing)) => backing,
            Ok(None) => {
                warn!(
                    "pod {pod_name}: claim {} is missing or not bound",
                    claim.claim_name
                );
                return None;
            }
            Err(e) => {
                error!(
                    "pod {pod_name}: failed to get claim {}: {e:?}",
                    claim.claim_name
                );
                return None;
            }
        };

        let path = host_volume_path(&self.pods_root, &pod.metadata.uid, &backing);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            Ok(false) => {
                warn!("pod {pod_name}: host path {} does not exist", path.display());
                None
            }
            Err(e) => {
                warn!("pod {pod_name}: cannot stat {}: {e}", path.display());
                None
            }
        }
    }

    async fn share(&self, host_path: &Path, mount_path: &str) -> Result<(), NfsError> {
        self.nfs.mkdir(mount_path).await?;
        if !self.nfs.has_mount(mount_path).await? {
            self.nfs.mount_bind(host_path, mount_path).await?;
        }
        if !self.nfs.has_export_entry(mount_path).await? {
            self.nfs.add_export_entry(mount_path).await?;
        }
        Ok(())
    }

    async fn unshare(&self, mount_path: &str) -> Result<(), NfsError> {
        if self.nfs.has_export_entry(mount_path).await? {
            self.nfs.del_export_entry(mount_path).await?;
        }
        if self.nfs.has_mount(mount_path).await? {
            // The export must be gone from the kernel table before the mount can go.
            self.nfs.refresh_exports().await?;
            self.nfs.umount(mount_path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::informer::PodCache;
    use async_trait::async_trait;
    use chrono::Utc;
    use common::{
        ContainerSpec, ObjectMeta, ObjectReference, PersistentVolumeClaimSource, PodPhase,
        PodSpec, PodStatus, Volume, VolumeMount,
    };
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct NfsState {
        mounts: HashSet<String>,
        exports: HashSet<String>,
        calls: Vec<String>,
        failing: HashSet<&'static str>,
    }

    /// In-memory NFS server that records every operation.
    #[derive(Default)]
    struct FakeNfs {
        state: Mutex<NfsState>,
    }

    impl FakeNfs {
        fn record(&self, op: &'static str, path: &str) -> Result<(), NfsError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("{op} {path}").trim_end().to_string());
            if state.failing.contains(op) {
                return Err(NfsError::Command {
                    command: op.to_string(),
                    code: Some(1),
                    output: "injected".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        fn clear_calls(&self) {
            self.state.lock().unwrap().calls.clear();
        }

        fn fail(&self, op: &'static str) {
            self.state.lock().unwrap().failing.insert(op);
        }

        fn seed(&self, path: &str) {
            let mut state = self.state.lock().unwrap();
            state.mounts.insert(path.to_string());
            state.exports.insert(path.to_string());
        }

        fn is_shared(&self, path: &str) -> (bool, bool) {
            let state = self.state.lock().unwrap();
            (state.mounts.contains(path), state.exports.contains(path))
        }
    }

    #[async_trait]
    impl NfsServer for FakeNfs {
        async fn mkdir(&self, path: &str) -> Result<(), NfsError> {
            self.record("mkdir", path)
        }

        async fn has_mount(&self, path: &str) -> Result<bool, NfsError> {
            self.record("has_mount", path)?;
            Ok(self.state.lock().unwrap().mounts.contains(path))
        }

        async fn mount_bind(&self, _source: &Path, target: &str) -> Result<(), NfsError> {
            self.record("mount_bind", target)?;
            self.state.lock().unwrap().mounts.insert(target.to_string());
            Ok(())
        }

        async fn has_export_entry(&self, path: &str) -> Result<bool, NfsError> {
            self.record("has_export", path)?;
            Ok(self.state.lock().unwrap().exports.contains(path))
        }

        async fn add_export_entry(&self, path: &str) -> Result<(), NfsError> {
            self.record("add_export", path)?;
            self.state.lock().unwrap().exports.insert(path.to_string());
            Ok(())
        }

        async fn del_export_entry(&self, path: &str) -> Result<(), NfsError> {
            self.record("del_export", path)?;
            self.state.lock().unwrap().exports.remove(path);
            Ok(())
        }

        async fn umount(&self, path: &str) -> Result<(), NfsError> {
            self.record("umount", path)?;
            self.state.lock().unwrap().mounts.remove(path);
            Ok(())
        }

        async fn refresh_exports(&self) -> Result<(), NfsError> {
            self.record("refresh", "")
        }
    }

    /// claim name -> backing volume
    struct StaticClaims(HashMap<String, String>);

    #[async_trait]
    impl ClaimResolver for StaticClaims {
        async fn backing_volume(
            &self,
            _namespace: &str,
            claim: &str,
        ) -> anyhow::Result<Option<String>> {
            Ok(self.0.get(claim).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingRecorder {
        events: Mutex<Vec<(ObjectReference, EventType, String, String)>>,
    }

    impl EventRecorder for RecordingRecorder {
        fn event(
            &self,
            object: &ObjectReference,
            event_type: EventType,
            reason: &str,
            message: &str,
        ) {
            self.events.lock().unwrap().push((
                object.clone(),
                event_type,
                reason.to_string(),
                message.to_string(),
            ));
        }
    }

    struct BrokenLister;

    #[async_trait]
    impl PodLister for BrokenLister {
        async fn get_by_key(
            &self,
            _namespace: &str,
            _name: &str,
        ) -> anyhow::Result<Option<PodTask>> {
            anyhow::bail!("cache unavailable")
        }

        fn has_synced(&self) -> bool {
            true
        }
    }

    struct Harness {
        cache: Arc<PodCache>,
        nfs: Arc<FakeNfs>,
        recorder: Arc<RecordingRecorder>,
        reconciler: Reconciler,
        pods_root: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let pods_root = TempDir::new().unwrap();
            let cache = Arc::new(PodCache::new());
            let nfs = Arc::new(FakeNfs::default());
            let recorder = Arc::new(RecordingRecorder::default());
            let claims = StaticClaims(HashMap::from([
                ("cache-claim".to_string(), "pv-cache".to_string()),
                ("logs-claim".to_string(), "pv-logs".to_string()),
                ("token-claim".to_string(), "pv-token".to_string()),
                ("ghost-claim".to_string(), "pv-ghost".to_string()),
            ]));
            let reconciler = Reconciler::new(
                cache.clone(),
                Arc::new(claims),
                nfs.clone(),
                recorder.clone(),
                pods_root.path(),
                "NFSShare",
            );
            Self {
                cache,
                nfs,
                recorder,
                reconciler,
                pods_root,
            }
        }

        /// Create the host directory of `volume` for pod `uid`.
        fn provision(&self, uid: &str, volume: &str) {
            std::fs::create_dir_all(host_volume_path(self.pods_root.path(), uid, volume)).unwrap();
        }

        async fn put(&self, pod: PodTask) {
            let store_key = format!("/registry/pods/{}", pod.metadata.name);
            self.cache.upsert(&store_key, pod).await.unwrap();
        }

        /// Delete the pod the way the store does, without a graceful period.
        async fn delete(&self, name: &str) {
            let store_key = format!("/registry/pods/{name}");
            self.cache.mark_deleted(&store_key, None).await.unwrap();
        }

        fn events(&self) -> Vec<(ObjectReference, EventType, String, String)> {
            self.recorder.events.lock().unwrap().clone()
        }
    }

    fn volume(name: &str, claim: &str) -> Volume {
        Volume {
            name: name.to_string(),
            persistent_volume_claim: Some(PersistentVolumeClaimSource {
                claim_name: claim.to_string(),
                read_only: false,
            }),
        }
    }

    fn mount(name: &str, path: &str) -> VolumeMount {
        VolumeMount {
            name: name.to_string(),
            mount_path: path.to_string(),
            read_only: false,
        }
    }

    /// Running pod `nsA/<name>` with uid `u-<name>` mounting `cache` and `logs`.
    fn pod(name: &str, label: Option<&str>) -> PodTask {
        let labels = label
            .map(|v| HashMap::from([("NFSShare".to_string(), v.to_string())]))
            .unwrap_or_default();
        PodTask {
            api_version: "v1".to_string(),
            kind: "Pod".to_string(),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: "nsA".to_string(),
                uid: format!("u-{name}"),
                resource_version: "1".to_string(),
                labels,
                ..Default::default()
            },
            spec: PodSpec {
                containers: vec![ContainerSpec {
                    name: "app".to_string(),
                    volume_mounts: vec![mount("cache", "/data/cache"), mount("logs", "/data/logs")],
                    ..Default::default()
                }],
                volumes: vec![volume("cache", "cache-claim"), volume("logs", "logs-claim")],
                ..Default::default()
            },
            status: PodStatus {
                phase: PodPhase::Running,
                ..Default::default()
            },
        }
    }

    fn is_mutation(call: &str) -> bool {
        ["mount_bind", "add_export", "del_export", "umount"]
            .iter()
            .any(|op| call.starts_with(op))
    }

    #[tokio::test]
    async fn test_share_labelled_volume() {
        let h = Harness::new();
        h.provision("u-u1", "pv-cache");
        h.put(pod("u1", Some("cache"))).await;

        h.reconciler.sync("nsA/u1").await.unwrap();

        // logs has no host directory, so only cache is touched.
        assert_eq!(
            h.nfs.calls(),
            vec![
                "mkdir /data/cache",
                "has_mount /data/cache",
                "mount_bind /data/cache",
                "has_export /data/cache",
                "add_export /data/cache",
                "refresh",
            ]
        );
        assert_eq!(h.nfs.is_shared("/data/cache"), (true, true));

        let events = h.events();
        assert_eq!(events.len(), 1);
        let (object, event_type, reason, message) = &events[0];
        assert_eq!(object.name, "u1");
        assert_eq!(*event_type, EventType::Normal);
        assert_eq!(reason, "Synced");
        assert_eq!(message, "Add nfs share path success.");
    }

    #[tokio::test]
    async fn test_terminating_pod_is_torn_down() {
        let h = Harness::new();
        h.provision("u-u1", "pv-cache");
        h.nfs.seed("/data/cache");
        let mut terminating = pod("u1", Some("cache"));
        terminating.metadata.deletion_timestamp = Some(Utc::now());
        h.put(terminating).await;

        h.reconciler.sync("nsA/u1").await.unwrap();

        assert_eq!(
            h.nfs.calls(),
            vec![
                "has_export /data/cache",
                "del_export /data/cache",
                "has_mount /data/cache",
                "refresh",
                "umount /data/cache",
                "refresh",
            ]
        );
        assert_eq!(h.nfs.is_shared("/data/cache"), (false, false));
        assert_eq!(h.events().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_pod_is_torn_down_then_released() {
        let h = Harness::new();
        h.provision("u-u1", "pv-cache");
        h.provision("u-u1", "pv-logs");
        h.put(pod("u1", Some("cache,logs"))).await;
        h.reconciler.sync("nsA/u1").await.unwrap();
        assert_eq!(h.nfs.is_shared("/data/cache"), (true, true));
        assert_eq!(h.nfs.is_shared("/data/logs"), (true, true));

        h.delete("u1").await;
        h.reconciler.sync("nsA/u1").await.unwrap();

        assert_eq!(h.nfs.is_shared("/data/cache"), (false, false));
        assert_eq!(h.nfs.is_shared("/data/logs"), (false, false));
        assert_eq!(h.events().len(), 2);
        assert!(h.cache.get_by_key("nsA", "u1").await.unwrap().is_none());
        assert_eq!(h.cache.pending_deletions().await, 0);

        // Once released, a late retry of the key has nothing left to do.
        h.nfs.clear_calls();
        h.reconciler.sync("nsA/u1").await.unwrap();
        assert!(h.nfs.calls().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_pod_is_released_even_when_skipped() {
        let h = Harness::new();
        let mut finished = pod("u6", Some("cache"));
        finished.status.phase = PodPhase::Succeeded;
        h.put(finished).await;
        h.delete("u6").await;

        h.reconciler.sync("nsA/u6").await.unwrap();
        assert!(h.nfs.calls().is_empty());
        assert_eq!(h.cache.pending_deletions().await, 0);
    }

    #[tokio::test]
    async fn test_live_terminating_pod_stays_cached() {
        let h = Harness::new();
        let mut terminating = pod("u7", Some("cache"));
        terminating.metadata.deletion_timestamp = Some(Utc::now());
        h.put(terminating).await;

        h.reconciler.sync("nsA/u7").await.unwrap();
        assert!(h.cache.get_by_key("nsA", "u7").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_volume_dropped_from_label_is_revoked() {
        let h = Harness::new();
        h.provision("u-u2", "pv-cache");
        h.provision("u-u2", "pv-logs");
        h.put(pod("u2", Some("cache,logs"))).await;
        h.reconciler.sync("nsA/u2").await.unwrap();
        assert_eq!(h.nfs.is_shared("/data/cache"), (true, true));
        assert_eq!(h.nfs.is_shared("/data/logs"), (true, true));

        let mut relabelled = pod("u2", Some("logs"));
        relabelled.metadata.resource_version = "2".to_string();
        h.put(relabelled).await;
        h.nfs.clear_calls();
        h.reconciler.sync("nsA/u2").await.unwrap();

        assert_eq!(h.nfs.is_shared("/data/cache"), (false, false));
        assert_eq!(h.nfs.is_shared("/data/logs"), (true, true));
        let mutations: Vec<String> = h.nfs.calls().into_iter().filter(|c| is_mutation(c)).collect();
        assert_eq!(mutations, vec!["del_export /data/cache", "umount /data/cache"]);
    }

    #[tokio::test]
    async fn test_label_removed_revokes_everything() {
        let h = Harness::new();
        h.provision("u-u2", "pv-cache");
        h.nfs.seed("/data/cache");
        h.put(pod("u2", None)).await;

        h.reconciler.sync("nsA/u2").await.unwrap();
        assert_eq!(h.nfs.is_shared("/data/cache"), (false, false));
    }

    #[tokio::test]
    async fn test_default_token_mounts_are_never_inspected() {
        let h = Harness::new();
        h.provision("u-u3", "pv-token");
        let mut p = pod("u3", Some("default-token-xyz"));
        p.spec.containers[0].volume_mounts = vec![mount(
            "default-token-xyz",
            "/var/run/secrets/kubernetes.io/serviceaccount",
        )];
        p.spec.volumes = vec![volume("default-token-xyz", "token-claim")];
        h.put(p).await;

        h.reconciler.sync("nsA/u3").await.unwrap();
        assert_eq!(h.nfs.calls(), vec!["refresh"]);
    }

    #[tokio::test]
    async fn test_missing_pod_issues_no_commands() {
        let h = Harness::new();
        h.reconciler.sync("nsA/bad").await.unwrap();
        assert!(h.nfs.calls().is_empty());
        assert!(h.events().is_empty());
    }

    #[tokio::test]
    async fn test_second_pass_only_checks() {
        let h = Harness::new();
        h.provision("u-u1", "pv-cache");
        h.put(pod("u1", Some("cache"))).await;
        h.reconciler.sync("nsA/u1").await.unwrap();
        h.nfs.clear_calls();

        h.reconciler.sync("nsA/u1").await.unwrap();
        let calls = h.nfs.calls();
        assert!(!calls.iter().any(|c| is_mutation(c)), "{calls:?}");
        assert_eq!(calls.last().map(String::as_str), Some("refresh"));
        assert_eq!(h.nfs.is_shared("/data/cache"), (true, true));
    }

    #[tokio::test]
    async fn test_skips_pods_that_are_not_running_or_have_no_volumes() {
        let h = Harness::new();
        h.provision("u-pending", "pv-cache");
        let mut pending = pod("pending", Some("cache"));
        pending.status.phase = PodPhase::Pending;
        h.put(pending).await;
        let mut bare = pod("bare", Some("cache"));
        bare.spec.volumes.clear();
        h.put(bare).await;

        h.reconciler.sync("nsA/pending").await.unwrap();
        h.reconciler.sync("nsA/bare").await.unwrap();
        assert!(h.nfs.calls().is_empty());
        assert!(h.events().is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_volumes_are_skipped() {
        let h = Harness::new();
        let mut p = pod("u4", Some("cache,logs,scratch"));
        // logs points at a claim nobody knows, scratch has no claim at all, cache has
        // no directory on the host.
        p.spec.volumes = vec![
            volume("cache", "cache-claim"),
            volume("logs", "unknown-claim"),
            Volume {
                name: "scratch".to_string(),
                persistent_volume_claim: None,
            },
        ];
        p.spec.containers[0]
            .volume_mounts
            .push(mount("scratch", "/data/scratch"));
        h.put(p).await;

        h.reconciler.sync("nsA/u4").await.unwrap();
        assert_eq!(h.nfs.calls(), vec!["refresh"]);
        assert_eq!(h.events().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_step_abandons_only_that_mount() {
        let h = Harness::new();
        h.provision("u-u5", "pv-cache");
        h.provision("u-u5", "pv-logs");
        h.put(pod("u5", Some("cache,logs"))).await;
        h.nfs.fail("mount_bind");

        h.reconciler.sync("nsA/u5").await.unwrap();

        let calls = h.nfs.calls();
        // Neither mount gets exported once its bind fails, yet both were attempted.
        assert!(calls.contains(&"mount_bind /data/cache".to_string()));
        assert!(calls.contains(&"mount_bind /data/logs".to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("has_export")));
        assert_eq!(calls.last().map(String::as_str), Some("refresh"));
        assert_eq!(h.events().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_still_records_event() {
        let h = Harness::new();
        h.provision("u-u1", "pv-cache");
        h.put(pod("u1", Some("cache"))).await;
        h.nfs.fail("refresh");

        h.reconciler.sync("nsA/u1").await.unwrap();
        assert_eq!(h.nfs.is_shared("/data/cache"), (true, true));
        assert_eq!(h.events().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_key_is_permanent() {
        let h = Harness::new();
        let err = h.reconciler.sync("a/b/c").await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidKey(_)));
        assert!(!err.is_retryable());
        assert!(h.nfs.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cache_error_is_retryable() {
        let reconciler = Reconciler::new(
            Arc::new(BrokenLister),
            Arc::new(StaticClaims(HashMap::new())),
            Arc::new(FakeNfs::default()),
            Arc::new(RecordingRecorder::default()),
            "/nonexistent",
            "NFSShare",
        );
        let err = reconciler.sync("nsA/web").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("cache unavailable"));
    }

    #[test]
    fn test_host_volume_path_layout() {
        assert_eq!(
            host_volume_path(Path::new("/var/lib/kubelet/pods"), "u1", "pv-1"),
            PathBuf::from("/var/lib/kubelet/pods/u1/volumes/kubernetes.io~csi/pv-1/mount")
        );
    }
}
