//! Entity properties - named, optionally valued attributes on characters,
//! locations and objects, each with its own visibility rules.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ids::{CharacterId, LocationId, ObjectId, PropertyId};
use crate::validation::{validate_id_list, validate_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentType {
    Character,
    Location,
    Object,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Location => "location",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "character" => Ok(Self::Character),
            "location" => Ok(Self::Location),
            "object" => Ok(Self::Object),
            other => Err(DomainError::InvalidParentType(other.to_string())),
        }
    }
}

/// The entity a property hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum PropertyParent {
    Character(CharacterId),
    Location(LocationId),
    Object(ObjectId),
}

impl PropertyParent {
    pub fn parent_type(&self) -> ParentType {
        match self {
            Self::Character(_) => ParentType::Character,
            Self::Location(_) => ParentType::Location,
            Self::Object(_) => ParentType::Object,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Character(id) => id.to_uuid(),
            Self::Location(id) => id.to_uuid(),
            Self::Object(id) => id.to_uuid(),
        }
    }
}

impl fmt::Display for PropertyParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.parent_type(), self.id())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyVisibility {
    #[default]
    Public,
    Private,
    Restricted,
    System,
    Admin,
}

impl PropertyVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Restricted => "restricted",
            Self::System => "system",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for PropertyVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyVisibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "restricted" => Ok(Self::Restricted),
            "system" => Ok(Self::System),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::InvalidPropertyVisibility(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProperty {
    id: PropertyId,
    parent: PropertyParent,
    name: String,
    /// `None` for flag-style properties.
    value: Option<String>,
    owner: Option<CharacterId>,
    visibility: PropertyVisibility,
    flags: Vec<String>,
    visible_to: Option<Vec<CharacterId>>,
    excluded_from: Option<Vec<CharacterId>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EntityProperty {
    pub fn new(parent: PropertyParent, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: PropertyId::new(),
            parent,
            name: name.into(),
            value: None,
            owner: None,
            visibility: PropertyVisibility::Public,
            flags: Vec::new(),
            visible_to: None,
            excluded_from: None,
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> PropertyParent {
        self.parent
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[inline]
    pub fn owner(&self) -> Option<CharacterId> {
        self.owner
    }

    #[inline]
    pub fn visibility(&self) -> PropertyVisibility {
        self.visibility
    }

    #[inline]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    #[inline]
    pub fn visible_to(&self) -> Option<&[CharacterId]> {
        self.visible_to.as_deref()
    }

    #[inline]
    pub fn excluded_from(&self) -> Option<&[CharacterId]> {
        self.excluded_from.as_deref()
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: PropertyId) -> Self {
        self.id = id;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_owner(mut self, owner: CharacterId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_visibility(mut self, visibility: PropertyVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn with_visible_to(mut self, characters: Vec<CharacterId>) -> Self {
        self.visible_to = Some(characters);
        self
    }

    pub fn with_excluded_from(mut self, characters: Vec<CharacterId>) -> Self {
        self.excluded_from = Some(characters);
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn assign_id_if_nil(&mut self) -> bool {
        if self.id.is_nil() {
            self.id = PropertyId::new();
            return true;
        }
        false
    }

    pub fn set_value(&mut self, value: Option<String>, now: DateTime<Utc>) {
        self.value = value;
        self.updated_at = now;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Restricted properties without an explicit audience are visible to the
    /// owner alone and exclude nobody.
    pub fn apply_visibility_defaults(&mut self) {
        if self.visibility != PropertyVisibility::Restricted {
            return;
        }
        if self.visible_to.is_none() {
            self.visible_to = Some(self.owner.into_iter().collect());
        }
        if self.excluded_from.is_none() {
            self.excluded_from = Some(Vec::new());
        }
    }

    // =========================================================================
    // Domain Logic
    // =========================================================================

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name)?;
        let visible_to = self.visible_to.as_deref().unwrap_or_default();
        let excluded_from = self.excluded_from.as_deref().unwrap_or_default();

        if self.visibility != PropertyVisibility::Restricted {
            if !visible_to.is_empty() {
                return Err(DomainError::validation(
                    "visible_to",
                    "must be empty for non-restricted visibility",
                ));
            }
            if !excluded_from.is_empty() {
                return Err(DomainError::validation(
                    "excluded_from",
                    "must be empty for non-restricted visibility",
                ));
            }
            return Ok(());
        }

        validate_id_list("visible_to", visible_to)?;
        validate_id_list("excluded_from", excluded_from)?;
        let audience: HashSet<_> = visible_to.iter().collect();
        if let Some(overlap) = excluded_from.iter().find(|id| audience.contains(id)) {
            return Err(DomainError::validation(
                "excluded_from",
                format!("overlaps visible_to: {}", overlap),
            ));
        }
        Ok(())
    }

    /// Whether `character_id` may read this property.
    pub fn is_visible_to(&self, character_id: CharacterId, is_admin: bool) -> bool {
        match self.visibility {
            PropertyVisibility::Public => true,
            PropertyVisibility::Private => self.owner == Some(character_id),
            PropertyVisibility::Restricted => {
                let excluded = self
                    .excluded_from
                    .as_deref()
                    .is_some_and(|ids| ids.contains(&character_id));
                let listed = self
                    .visible_to
                    .as_deref()
                    .is_some_and(|ids| ids.contains(&character_id));
                !excluded && listed
            }
            PropertyVisibility::System => false,
            PropertyVisibility::Admin => is_admin,
        }
    }
}
