use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TypeMeta {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(rename = "kind")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub uid: String,
    /// Filled from the store revision when the object is read back, never trusted from the yaml.
    #[serde(rename = "resourceVersion", default)]
    pub resource_version: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// Set once deletion of the object has been requested.
    #[serde(
        rename = "deletionTimestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

pub fn default_namespace() -> String {
    "default".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PodSpec {
    //if pod is distributed to a node ,then this field should be filled with node-id
    #[serde(default)]
    pub nodename: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(rename = "initContainers", alias = "init_containers", default)]
    pub init_containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(rename = "volumeMounts", default)]
    pub volume_mounts: Vec<VolumeMount>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VolumeMount {
    /// Name of the pod volume this mount refers to.
    pub name: String,
    #[serde(rename = "mountPath")]
    pub mount_path: String,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
}

/// A volume declared by the pod. Only claim-backed volumes can be shared.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Volume {
    pub name: String,
    #[serde(
        rename = "persistentVolumeClaim",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub persistent_volume_claim: Option<PersistentVolumeClaimSource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PersistentVolumeClaimSource {
    #[serde(rename = "claimName")]
    pub claim_name: String,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum PodPhase {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PodStatus {
    #[serde(default)]
    pub phase: PodPhase,
    #[serde(rename = "containerStatuses", default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContainerStatus {
    pub name: String,
    /// Runtime-prefixed id, e.g. `docker://<id>`.
    #[serde(rename = "containerID", default)]
    pub container_id: String,
    #[serde(default)]
    pub ready: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PodTask {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(rename = "kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

impl PodTask {
    pub fn is_running(&self) -> bool {
        self.status.phase == PodPhase::Running
    }

    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.spec.volumes.iter().find(|v| v.name == name)
    }

    pub fn object_reference(&self) -> ObjectReference {
        ObjectReference {
            kind: self.kind.clone(),
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
            uid: self.metadata.uid.clone(),
            resource_version: self.metadata.resource_version.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PersistentVolumeClaimSpec {
    /// Name of the backing volume the claim is bound to, empty while pending.
    #[serde(rename = "volumeName", default)]
    pub volume_name: String,
    #[serde(rename = "storageClassName", default)]
    pub storage_class_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PersistentVolumeClaim {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(rename = "kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PersistentVolumeClaimSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ObjectReference {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(rename = "resourceVersion", default)]
    pub resource_version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Normal => write!(f, "Normal"),
            EventType::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EventSource {
    #[serde(default)]
    pub component: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Event {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(rename = "kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(rename = "involvedObject")]
    pub involved_object: ObjectReference,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
    #[serde(default)]
    pub source: EventSource,
    #[serde(rename = "firstTimestamp")]
    pub first_timestamp: DateTime<Utc>,
    #[serde(rename = "lastTimestamp")]
    pub last_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub count: u32,
}
