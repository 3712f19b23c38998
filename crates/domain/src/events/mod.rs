//! World event vocabulary: event types, stream names and payloads.

mod payloads;
mod streams;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use payloads::{
    EntityType, ExaminePayload, ExamineTargetType, MovePayload, ObjectCreatePayload,
    ObjectGivePayload,
};
pub use streams::{
    character_stream, location_stream, object_stream, stream_for, BROADCAST_LOCATION_STREAM,
};

/// Tag attached to every published world event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Move,
    ObjectCreate,
    ObjectExamine,
    ObjectGive,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::ObjectCreate => "object_create",
            Self::ObjectExamine => "object_examine",
            Self::ObjectGive => "object_give",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
