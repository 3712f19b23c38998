use uuid::Uuid;

use crate::ids::{CharacterId, LocationId, ObjectId};
use crate::value_objects::ContainmentType;

/// Broadcast stream for location events not bound to a single location.
pub const BROADCAST_LOCATION_STREAM: &str = "location:*";

pub fn location_stream(id: LocationId) -> String {
    format!("location:{}", id)
}

pub fn character_stream(id: CharacterId) -> String {
    format!("character:{}", id)
}

pub fn object_stream(id: ObjectId) -> String {
    format!("object:{}", id)
}

/// Stream for a containment target. `None` has no stream of its own.
pub fn stream_for(kind: ContainmentType, id: Uuid) -> Option<String> {
    match kind {
        ContainmentType::Location => Some(location_stream(LocationId::from_uuid(id))),
        ContainmentType::Character => Some(character_stream(CharacterId::from_uuid(id))),
        ContainmentType::Object => Some(object_stream(ObjectId::from_uuid(id))),
        ContainmentType::None => None,
    }
}
