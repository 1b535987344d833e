//! Pod events, logged and written to the store in the background.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use common::{Event, EventSource, EventType, ObjectMeta, ObjectReference};
use log::{info, warn};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use crate::api::xlinestore::XlineStore;

pub const COMPONENT: &str = "nfs-controller";

/// Records an event about an object. Never blocks and never fails.
pub trait EventRecorder: Send + Sync {
    fn event(&self, object: &ObjectReference, event_type: EventType, reason: &str, message: &str);
}

/// Where recorded events end up.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn write(&self, event: &Event) -> Result<()>;
}

#[async_trait]
impl EventSink for XlineStore {
    async fn write(&self, event: &Event) -> Result<()> {
        self.put_event(event).await
    }
}

pub struct EventBroadcaster {
    tx: UnboundedSender<Event>,
    component: String,
}

impl EventBroadcaster {
    /// Spawn the writer task. It exits once every broadcaster clone is dropped and the
    /// backlog has been written.
    pub fn start(sink: Arc<dyn EventSink>, component: impl Into<String>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = unbounded_channel::<Event>();
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                info!(
                    "Event({}/{}): type: '{}' reason: '{}' {}",
                    event.involved_object.namespace,
                    event.involved_object.name,
                    event.event_type,
                    event.reason,
                    event.message
                );
                if let Err(e) = sink.write(&event).await {
                    warn!("Failed to write event {}: {e:?}", event.metadata.name);
                }
            }
        });
        (
            Self {
                tx,
                component: component.into(),
            },
            handle,
        )
    }

    fn build(
        &self,
        object: &ObjectReference,
        event_type: EventType,
        reason: &str,
        message: &str,
    ) -> Event {
        let now = Utc::now();
        let suffix = now.timestamp_nanos_opt().unwrap_or_default();
        Event {
            api_version: "v1".to_string(),
            kind: "Event".to_string(),
            metadata: ObjectMeta {
                name: format!("{}.{suffix:x}", object.name),
                namespace: object.namespace.clone(),
                ..Default::default()
            },
            involved_object: object.clone(),
            event_type,
            reason: reason.to_string(),
            message: message.to_string(),
            source: EventSource {
                component: self.component.clone(),
            },
            first_timestamp: now,
            last_timestamp: now,
            count: 1,
        }
    }
}

impl EventRecorder for EventBroadcaster {
    fn event(&self, object: &ObjectReference, event_type: EventType, reason: &str, message: &str) {
        let event = self.build(object, event_type, reason, message);
        if self.tx.send(event).is_err() {
            warn!("event writer has stopped, dropping {reason} event for {}", object.name);
        }
    }
}
