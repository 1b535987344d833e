use common::PodTask;

use crate::informer::store::{KeyError, meta_namespace_key};

/// Change notification delivered to informer subscribers.
#[derive(Debug, Clone)]
pub enum PodEvent {
    Added(Box<PodTask>),
    /// `(old, new)`
    Updated(Box<PodTask>, Box<PodTask>),
    Deleted(DeletedPod),
}

#[derive(Debug, Clone)]
pub enum DeletedPod {
    /// The deletion was observed on the watch stream.
    Known(Box<PodTask>),
    /// The pod vanished while the watch was down and was only noticed on relist, `pod`
    /// is the last state the cache had for it.
    FinalStateUnknown { key: String, pod: Box<PodTask> },
}

impl DeletedPod {
    pub fn pod(&self) -> &PodTask {
        match self {
            DeletedPod::Known(pod) => pod.as_ref(),
            DeletedPod::FinalStateUnknown { pod, .. } => pod.as_ref(),
        }
    }
}

/// Key of a deleted pod, taken from the tombstone when the final state is unknown.
pub fn deletion_handling_key(deleted: &DeletedPod) -> Result<String, KeyError> {
    match deleted {
        DeletedPod::Known(pod) => meta_namespace_key(pod),
        DeletedPod::FinalStateUnknown { key, .. } => Ok(key.clone()),
    }
}
