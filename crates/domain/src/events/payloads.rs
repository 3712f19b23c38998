//! Event payloads. These describe a committed state change for subscribers
//! and are serialized as flat JSON objects with stable field names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ids::{CharacterId, ExitId, LocationId, ObjectId};
use crate::value_objects::{Containment, ContainmentType};

use super::streams::{character_stream, location_stream, stream_for};

/// What moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Character,
    Object,
}

// =============================================================================
// Move
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePayload {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub from_type: ContainmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_id: Option<Uuid>,
    pub to_type: ContainmentType,
    pub to_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_id: Option<ExitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_name: Option<String>,
}

impl MovePayload {
    /// Character moving between locations. `from = None` is first placement.
    pub fn character(id: CharacterId, from: Option<LocationId>, to: LocationId) -> Self {
        Self {
            entity_type: EntityType::Character,
            entity_id: id.to_uuid(),
            from_type: if from.is_some() {
                ContainmentType::Location
            } else {
                ContainmentType::None
            },
            from_id: from.map(LocationId::to_uuid),
            to_type: ContainmentType::Location,
            to_id: to.to_uuid(),
            exit_id: None,
            exit_name: None,
        }
    }

    /// Object moving between containments. An empty `from` is first placement.
    pub fn object(id: ObjectId, from: Containment, to: Containment) -> Self {
        Self {
            entity_type: EntityType::Object,
            entity_id: id.to_uuid(),
            from_type: from.kind(),
            from_id: from.target_id(),
            to_type: to.kind(),
            to_id: to.target_id().unwrap_or_else(Uuid::nil),
            exit_id: None,
            exit_name: None,
        }
    }

    pub fn with_exit(mut self, exit_id: ExitId, exit_name: impl Into<String>) -> Self {
        self.exit_id = Some(exit_id);
        self.exit_name = Some(exit_name.into());
        self
    }

    /// Checks entity, origin, then destination.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.entity_id.is_nil() {
            return Err(DomainError::validation("entity_id", "cannot be empty"));
        }
        let from_missing = self.from_id.filter(|id| !id.is_nil()).is_none();
        if from_missing && self.from_type != ContainmentType::None {
            return Err(DomainError::validation("from_id", "cannot be empty"));
        }
        if self.to_type == ContainmentType::None {
            return Err(DomainError::validation(
                "to_type",
                "must be 'location', 'character', or 'object'",
            ));
        }
        if self.to_id.is_nil() {
            return Err(DomainError::validation("to_id", "cannot be empty"));
        }
        Ok(())
    }

    /// Moves are announced on the destination's stream.
    pub fn stream(&self) -> Option<String> {
        stream_for(self.to_type, self.to_id)
    }
}

// =============================================================================
// Object create
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreatePayload {
    pub object_id: ObjectId,
    pub object_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
}

impl ObjectCreatePayload {
    pub fn new(object_id: ObjectId, object_name: impl Into<String>, location_id: Option<LocationId>) -> Self {
        Self {
            object_id,
            object_name: object_name.into(),
            location_id,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.object_id.is_nil() {
            return Err(DomainError::validation("object_id", "cannot be empty"));
        }
        if self.object_name.is_empty() {
            return Err(DomainError::validation("object_name", "cannot be empty"));
        }
        Ok(())
    }

    /// The object's location stream, or the broadcast stream when unplaced.
    pub fn stream(&self) -> String {
        match self.location_id {
            Some(id) => location_stream(id),
            None => super::BROADCAST_LOCATION_STREAM.to_string(),
        }
    }
}

// =============================================================================
// Give
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectGivePayload {
    pub object_id: ObjectId,
    pub object_name: String,
    pub from_character_id: CharacterId,
    pub to_character_id: CharacterId,
}

impl ObjectGivePayload {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.object_id.is_nil() {
            return Err(DomainError::validation("object_id", "cannot be empty"));
        }
        if self.object_name.is_empty() {
            return Err(DomainError::validation("object_name", "cannot be empty"));
        }
        if self.from_character_id.is_nil() {
            return Err(DomainError::validation("from_character_id", "cannot be empty"));
        }
        if self.to_character_id.is_nil() {
            return Err(DomainError::validation("to_character_id", "cannot be empty"));
        }
        if self.from_character_id == self.to_character_id {
            return Err(DomainError::validation(
                "to_character_id",
                "cannot give object to self",
            ));
        }
        Ok(())
    }

    /// Gives are delivered to the recipient.
    pub fn stream(&self) -> String {
        character_stream(self.to_character_id)
    }
}

// =============================================================================
// Examine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamineTargetType {
    Location,
    Object,
    Character,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExaminePayload {
    pub character_id: CharacterId,
    pub target_type: ExamineTargetType,
    pub target_id: Uuid,
    pub target_name: String,
    /// Where the examiner stands; the event is spectated there.
    pub location_id: LocationId,
}

impl ExaminePayload {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.character_id.is_nil() {
            return Err(DomainError::validation("character_id", "cannot be empty"));
        }
        if self.target_id.is_nil() {
            return Err(DomainError::validation("target_id", "cannot be empty"));
        }
        if self.target_name.is_empty() {
            return Err(DomainError::validation("target_name", "cannot be empty"));
        }
        if self.location_id.is_nil() {
            return Err(DomainError::validation("location_id", "cannot be empty"));
        }
        Ok(())
    }

    pub fn stream(&self) -> String {
        location_stream(self.location_id)
    }
}
