use std::collections::HashSet;

use common::PodTask;

/// Volume names a pod asks to share, read from the share label.
///
/// The label value is split on `,` as is: `"a, b"` names `a` and ` b`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShareDirective {
    volumes: HashSet<String>,
}

impl ShareDirective {
    pub fn parse(value: &str) -> Self {
        if value.is_empty() {
            return Self::default();
        }
        Self {
            volumes: value.split(',').map(str::to_string).collect(),
        }
    }

    /// Directive of `pod`, empty when the label is missing.
    pub fn from_pod(pod: &PodTask, share_label: &str) -> Self {
        pod.metadata
            .labels
            .get(share_label)
            .map(|value| Self::parse(value))
            .unwrap_or_default()
    }

    pub fn contains(&self, volume: &str) -> bool {
        self.volumes.contains(volume)
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}
