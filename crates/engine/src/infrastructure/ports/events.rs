//! Event transport ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mushworld_domain::{EventId, EventType};
use serde::{Deserialize, Serialize};

use super::error::{AppendError, PublishError};

/// One-method publisher: deliver serialized bytes to a named stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        stream: &str,
        event_type: EventType,
        payload: &[u8],
    ) -> Result<(), PublishError>;
}

/// An event as recorded in the durable log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: EventId,
    pub stream: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub payload: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventAppender: Send + Sync {
    async fn append(&self, event: StoredEvent) -> Result<(), AppendError>;
}
