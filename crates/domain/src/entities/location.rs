//! Location entity - rooms, scenes and instances in the world
//!
//! A scene may shadow a persistent location and inherit its name and
//! description while its own values are empty.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, LocationId};
use crate::validation::{validate_description, validate_name};
use crate::value_objects::{default_replay_policy, parse_replay_policy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Persistent,
    Scene,
    Instance,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::Scene => "scene",
            Self::Instance => "instance",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persistent" => Ok(Self::Persistent),
            "scene" => Ok(Self::Scene),
            "instance" => Ok(Self::Instance),
            other => Err(DomainError::InvalidLocationType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    location_type: LocationType,
    shadows_id: Option<LocationId>,
    name: String,
    description: String,
    owner_id: Option<CharacterId>,
    replay_policy: String,
    created_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
}

impl Location {
    /// New location with a fresh id and the default replay policy for its type.
    pub fn new(
        location_type: LocationType,
        name: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LocationId::new(),
            location_type,
            shadows_id: None,
            name: name.into(),
            description: description.into(),
            owner_id: None,
            replay_policy: default_replay_policy(location_type),
            created_at: now,
            archived_at: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> LocationId {
        self.id
    }

    #[inline]
    pub fn location_type(&self) -> LocationType {
        self.location_type
    }

    #[inline]
    pub fn shadows_id(&self) -> Option<LocationId> {
        self.shadows_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn owner_id(&self) -> Option<CharacterId> {
        self.owner_id
    }

    #[inline]
    pub fn replay_policy(&self) -> &str {
        &self.replay_policy
    }

    /// Number of events replayed to a new observer; malformed policies replay none.
    pub fn replay_limit(&self) -> i32 {
        parse_replay_policy(&self.replay_policy)
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: LocationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_shadows(mut self, shadows_id: LocationId) -> Self {
        self.shadows_id = Some(shadows_id);
        self
    }

    pub fn with_owner(mut self, owner_id: CharacterId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_replay_policy(mut self, policy: impl Into<String>) -> Self {
        self.replay_policy = policy.into();
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replaces a nil id with a fresh one. Returns true when an id was assigned.
    pub fn assign_id_if_nil(&mut self) -> bool {
        if self.id.is_nil() {
            self.id = LocationId::new();
            return true;
        }
        false
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_owner(&mut self, owner_id: Option<CharacterId>) {
        self.owner_id = owner_id;
    }

    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.archived_at = Some(now);
    }

    // =========================================================================
    // Domain Logic
    // =========================================================================

    /// Checks name then description. The type is enforced when parsed.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name)?;
        validate_description(&self.description)
    }

    /// Own description, or the shadowed location's when ours is empty.
    ///
    /// The parent is only consulted when this location actually shadows one
    /// and the caller supplied it.
    pub fn effective_description<'a>(&'a self, parent: Option<&'a Location>) -> &'a str {
        match (self.description.is_empty(), self.shadows_id, parent) {
            (true, Some(_), Some(parent)) => &parent.description,
            _ => &self.description,
        }
    }

    pub fn effective_name<'a>(&'a self, parent: Option<&'a Location>) -> &'a str {
        match (self.name.is_empty(), self.shadows_id, parent) {
            (true, Some(_), Some(parent)) => &parent.name,
            _ => &self.name,
        }
    }
}
