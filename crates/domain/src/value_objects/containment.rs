//! Where an object currently resides.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ids::{CharacterId, LocationId, ObjectId};

/// Kind of place an entity occupies, or `None` before first placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainmentType {
    Location,
    Character,
    Object,
    None,
}

impl ContainmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Character => "character",
            Self::Object => "object",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ContainmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location" => Ok(Self::Location),
            "character" => Ok(Self::Character),
            "object" => Ok(Self::Object),
            "none" => Ok(Self::None),
            _ => Err(DomainError::parse(format!("unknown containment type: {}", s))),
        }
    }
}

/// Tri-state placement of an object.
///
/// Exactly one reference must be set once an object is placed. The fields are
/// public so that callers can describe a destination directly; [`validate`]
/// is the boundary check.
///
/// [`validate`]: Containment::validate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Containment {
    pub location_id: Option<LocationId>,
    pub character_id: Option<CharacterId>,
    pub object_id: Option<ObjectId>,
}

impl Containment {
    pub fn in_location(id: LocationId) -> Self {
        Self {
            location_id: Some(id),
            ..Self::default()
        }
    }

    pub fn held_by(id: CharacterId) -> Self {
        Self {
            character_id: Some(id),
            ..Self::default()
        }
    }

    pub fn inside(id: ObjectId) -> Self {
        Self {
            object_id: Some(id),
            ..Self::default()
        }
    }

    /// Succeeds iff exactly one reference is set.
    pub fn validate(&self) -> Result<(), DomainError> {
        let count = usize::from(self.location_id.is_some())
            + usize::from(self.character_id.is_some())
            + usize::from(self.object_id.is_some());
        if count != 1 {
            return Err(DomainError::InvalidContainment);
        }
        Ok(())
    }

    /// Kind of the first set reference, checked location, character, object.
    pub fn kind(&self) -> ContainmentType {
        if self.location_id.is_some() {
            ContainmentType::Location
        } else if self.character_id.is_some() {
            ContainmentType::Character
        } else if self.object_id.is_some() {
            ContainmentType::Object
        } else {
            ContainmentType::None
        }
    }

    /// Raw id of the first set reference, in the same order as [`Containment::kind`].
    pub fn target_id(&self) -> Option<Uuid> {
        self.location_id
            .map(LocationId::to_uuid)
            .or_else(|| self.character_id.map(CharacterId::to_uuid))
            .or_else(|| self.object_id.map(ObjectId::to_uuid))
    }

    pub fn is_empty(&self) -> bool {
        self.kind() == ContainmentType::None
    }
}
