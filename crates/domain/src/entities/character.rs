//! Character entity - a player's presence in the world

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, LocationId, PlayerId};
use crate::validation::{validate_description, validate_name};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    id: CharacterId,
    player_id: PlayerId,
    name: String,
    description: String,
    /// `None` while the character is not placed in the world.
    location_id: Option<LocationId>,
    created_at: DateTime<Utc>,
}

impl Character {
    pub fn new(
        player_id: PlayerId,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let character = Self {
            id: CharacterId::new(),
            player_id,
            name: name.into(),
            description: String::new(),
            location_id: None,
            created_at: now,
        };
        character.validate()?;
        Ok(character)
    }

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn player_id(&self) -> PlayerId {
        self.player_id
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
    pub fn location_id(&self) -> Option<LocationId> {
        self.location_id
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_in_world(&self) -> bool {
        self.location_id.is_some()
    }

    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location_id: LocationId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn assign_id_if_nil(&mut self) -> bool {
        if self.id.is_nil() {
            self.id = CharacterId::new();
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

    /// Places or removes the character. A nil location id is rejected.
    pub fn set_location(&mut self, location_id: Option<LocationId>) -> Result<(), DomainError> {
        if location_id.is_some_and(|id| id.is_nil()) {
            return Err(DomainError::validation("location_id", "cannot be zero"));
        }
        self.location_id = location_id;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.is_nil() {
            return Err(DomainError::validation("id", "cannot be zero"));
        }
        self.validate_fields()
    }

    /// Validation minus the id check.
    pub fn validate_fields(&self) -> Result<(), DomainError> {
        if self.player_id.is_nil() {
            return Err(DomainError::validation("player_id", "cannot be zero"));
        }
        validate_name(&self.name)?;
        validate_description(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_character_is_not_in_world() {
        let character = Character::new(PlayerId::new(), "Alice", Utc::now()).unwrap();
        assert!(!character.is_in_world());
        assert!(!character.id().is_nil());
    }

    #[test]
    fn rejects_nil_player() {
        let err = Character::new(PlayerId::nil(), "Alice", Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("player_id"));
    }

    #[test]
    fn rejects_nil_id_before_name() {
        let character = Character::new(PlayerId::new(), "Alice", Utc::now())
            .unwrap()
            .with_id(CharacterId::nil());
        assert_eq!(character.validate().unwrap_err().field(), Some("id"));
    }

    #[test]
    fn set_location_rejects_nil() {
        let mut character = Character::new(PlayerId::new(), "Alice", Utc::now()).unwrap();
        let err = character.set_location(Some(LocationId::nil())).unwrap_err();
        assert_eq!(err.field(), Some("location_id"));
        assert!(!character.is_in_world());

        let here = LocationId::new();
        character.set_location(Some(here)).unwrap();
        assert_eq!(character.location_id(), Some(here));
        character.set_location(None).unwrap();
        assert!(!character.is_in_world());
    }
}
