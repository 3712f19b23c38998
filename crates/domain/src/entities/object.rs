//! Object entity - things that sit in locations, in hands, or in containers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, ObjectId};
use crate::validation::{validate_description, validate_name};
use crate::value_objects::Containment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    id: ObjectId,
    name: String,
    description: String,
    containment: Containment,
    is_container: bool,
    owner_id: Option<CharacterId>,
    created_at: DateTime<Utc>,
}

impl Object {
    /// Creates a validated object placed at `containment`.
    pub fn new(
        name: impl Into<String>,
        containment: Containment,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let object = Self {
            id: ObjectId::new(),
            name: name.into(),
            description: String::new(),
            containment,
            is_container: false,
            owner_id: None,
            created_at: now,
        };
        object.validate()?;
        Ok(object)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
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
    pub fn containment(&self) -> Containment {
        self.containment
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.is_container
    }

    #[inline]
    pub fn owner_id(&self) -> Option<CharacterId> {
        self.owner_id
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True when a character is holding this object.
    pub fn is_held_by(&self, character_id: CharacterId) -> bool {
        self.containment.character_id == Some(character_id)
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_container(mut self, is_container: bool) -> Self {
        self.is_container = is_container;
        self
    }

    pub fn with_owner(mut self, owner_id: CharacterId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn assign_id_if_nil(&mut self) -> bool {
        if self.id.is_nil() {
            self.id = ObjectId::new();
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

    /// Replaces the containment after checking it is exactly-one.
    pub fn set_containment(&mut self, containment: Containment) -> Result<(), DomainError> {
        containment.validate()?;
        self.containment = containment;
        Ok(())
    }

    // =========================================================================
    // Domain Logic
    // =========================================================================

    /// Containment is checked first, so an ambiguous placement always reports
    /// as invalid containment.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.validate_containment()?;
        validate_name(&self.name)?;
        validate_description(&self.description)
    }

    pub fn validate_containment(&self) -> Result<(), DomainError> {
        self.containment.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::LocationId;

    fn lantern() -> Object {
        Object::new("lantern", Containment::in_location(LocationId::new()), Utc::now()).unwrap()
    }

    #[test]
    fn new_object_requires_placement() {
        let err = Object::new("lantern", Containment::default(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::InvalidContainment);
    }

    #[test]
    fn containment_error_wins_over_other_fields() {
        let mut object = lantern();
        object.set_name("");
        object.containment = Containment {
            location_id: Some(LocationId::new()),
            character_id: Some(CharacterId::new()),
            object_id: None,
        };
        assert_eq!(object.validate().unwrap_err(), DomainError::InvalidContainment);
    }

    #[test]
    fn set_containment_rejects_ambiguous_target() {
        let mut object = lantern();
        let before = object.containment();
        let result = object.set_containment(Containment {
            location_id: Some(LocationId::new()),
            character_id: None,
            object_id: Some(ObjectId::new()),
        });
        assert_eq!(result, Err(DomainError::InvalidContainment));
        assert_eq!(object.containment(), before);
    }

    #[test]
    fn set_containment_moves_object_into_hand() {
        let mut object = lantern();
        let holder = CharacterId::new();
        object.set_containment(Containment::held_by(holder)).unwrap();
        assert!(object.is_held_by(holder));
        assert!(object.validate_containment().is_ok());
    }

    #[test]
    fn validates_name_and_description() {
        let mut object = lantern();
        object.set_description("bad\u{1b}");
        assert_eq!(object.validate().unwrap_err().field(), Some("description"));
    }
}
