//! Event publishing backed by a durable event log.

use std::sync::Arc;

use async_trait::async_trait;
use mushworld_domain::{EventId, EventType};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    AppendError, ClockPort, EventAppender, EventPublisher, PublishError, StoredEvent,
};

/// Actor recorded on every event this service appends.
pub const WORLD_SERVICE_ACTOR: &str = "world-service";

/// Publishes by appending a [`StoredEvent`] to the log.
pub struct EventStorePublisher {
    appender: Arc<dyn EventAppender>,
    clock: Arc<dyn ClockPort>,
}

impl EventStorePublisher {
    pub fn new(appender: Arc<dyn EventAppender>, clock: Arc<dyn ClockPort>) -> Self {
        Self { appender, clock }
    }
}

#[async_trait]
impl EventPublisher for EventStorePublisher {
    async fn publish(
        &self,
        stream: &str,
        event_type: EventType,
        payload: &[u8],
    ) -> Result<(), PublishError> {
        let event = StoredEvent {
            id: EventId::new(),
            stream: stream.to_string(),
            event_type,
            timestamp: self.clock.now(),
            actor: WORLD_SERVICE_ACTOR.to_string(),
            payload: payload.to_vec(),
        };
        self.appender.append(event).await.map_err(PublishError::Append)
    }
}

/// Append-only log kept in process memory.
#[derive(Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<StoredEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events on `stream` in append order.
    pub async fn read_stream(&self, stream: &str) -> Vec<StoredEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.stream == stream)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Distinct stream names in first-append order.
    pub async fn streams(&self) -> Vec<String> {
        let events = self.events.read().await;
        let mut names: Vec<String> = Vec::new();
        for event in events.iter() {
            if !names.contains(&event.stream) {
                names.push(event.stream.clone());
            }
        }
        names
    }
}

#[async_trait]
impl EventAppender for InMemoryEventLog {
    async fn append(&self, event: StoredEvent) -> Result<(), AppendError> {
        self.events.write().await.push(event);
        Ok(())
    }
}
