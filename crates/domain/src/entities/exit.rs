//! Exit entity - a named passage from one location to another
//!
//! Exits may be bidirectional (materialising a return exit at the
//! destination), restricted in visibility, and locked.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::ids::{CharacterId, ExitId, LocationId};
use crate::validation::{validate_aliases, validate_lock_data, validate_name, validate_visible_to};

/// Bounded key/value data attached to a lock. Keys are identifiers.
///
/// Owned by the exit: cloning an exit copies its lock data.
pub type LockData = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitVisibility {
    #[default]
    All,
    /// Only the owner of the exit's source location sees it.
    Owner,
    /// Only characters in `visible_to` see it.
    List,
}

impl ExitVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Owner => "owner",
            Self::List => "list",
        }
    }
}

impl fmt::Display for ExitVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExitVisibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "owner" => Ok(Self::Owner),
            "list" => Ok(Self::List),
            other => Err(DomainError::InvalidVisibility(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockType {
    Key,
    Password,
    Condition,
}

impl LockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Password => "password",
            Self::Condition => "condition",
        }
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key" => Ok(Self::Key),
            "password" => Ok(Self::Password),
            "condition" => Ok(Self::Condition),
            other => Err(DomainError::InvalidLockType(other.to_string())),
        }
    }
}

/// Lock state of a locked exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitLock {
    pub lock_type: LockType,
    #[serde(default)]
    pub data: LockData,
}

impl ExitLock {
    pub fn new(lock_type: LockType) -> Self {
        Self {
            lock_type,
            data: LockData::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    id: ExitId,
    from_location_id: LocationId,
    to_location_id: LocationId,
    name: String,
    aliases: Vec<String>,
    bidirectional: bool,
    return_name: String,
    visibility: ExitVisibility,
    visible_to: Vec<CharacterId>,
    lock: Option<ExitLock>,
    created_at: DateTime<Utc>,
}

impl Exit {
    /// Creates a validated exit visible to everyone.
    pub fn new(
        from_location_id: LocationId,
        to_location_id: LocationId,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let exit = Self {
            id: ExitId::new(),
            from_location_id,
            to_location_id,
            name: name.into(),
            aliases: Vec::new(),
            bidirectional: false,
            return_name: String::new(),
            visibility: ExitVisibility::All,
            visible_to: Vec::new(),
            lock: None,
            created_at: now,
        };
        exit.validate()?;
        Ok(exit)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ExitId {
        self.id
    }

    #[inline]
    pub fn from_location_id(&self) -> LocationId {
        self.from_location_id
    }

    #[inline]
    pub fn to_location_id(&self) -> LocationId {
        self.to_location_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[inline]
    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    #[inline]
    pub fn return_name(&self) -> &str {
        &self.return_name
    }

    #[inline]
    pub fn visibility(&self) -> ExitVisibility {
        self.visibility
    }

    #[inline]
    pub fn visible_to(&self) -> &[CharacterId] {
        &self.visible_to
    }

    #[inline]
    pub fn lock(&self) -> Option<&ExitLock> {
        self.lock.as_ref()
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: ExitId) -> Self {
        self.id = id;
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the exit bidirectional; the return exit is named `return_name`.
    pub fn with_return(mut self, return_name: impl Into<String>) -> Self {
        self.bidirectional = true;
        self.return_name = return_name.into();
        self
    }

    pub fn with_visibility(mut self, visibility: ExitVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_visible_to(mut self, characters: Vec<CharacterId>) -> Self {
        self.visibility = ExitVisibility::List;
        self.visible_to = characters;
        self
    }

    pub fn with_lock(mut self, lock: ExitLock) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn with_to_location(mut self, to_location_id: LocationId) -> Self {
        self.to_location_id = to_location_id;
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn assign_id_if_nil(&mut self) -> bool {
        if self.id.is_nil() {
            self.id = ExitId::new();
            return true;
        }
        false
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_lock(&mut self, lock: Option<ExitLock>) {
        self.lock = lock;
    }

    pub fn set_visibility(&mut self, visibility: ExitVisibility) {
        self.visibility = visibility;
    }

    // =========================================================================
    // Domain Logic
    // =========================================================================

    /// Validation order: id, name, aliases, self-loop, lock data, visible-to list.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.is_nil() {
            return Err(DomainError::validation("id", "cannot be zero"));
        }
        self.validate_fields()
    }

    /// Everything [`Exit::validate`] checks except the id, for create paths
    /// where the id is assigned after validation.
    pub fn validate_fields(&self) -> Result<(), DomainError> {
        validate_name(&self.name)?;
        validate_aliases(&self.aliases)?;
        if !self.from_location_id.is_nil() && self.from_location_id == self.to_location_id {
            return Err(DomainError::SelfReferentialExit);
        }
        if let Some(lock) = &self.lock {
            validate_lock_data(&lock.data)?;
        }
        if self.visibility == ExitVisibility::List {
            validate_visible_to(&self.visible_to)?;
        }
        Ok(())
    }

    /// Case-insensitive match against the name and every alias.
    pub fn matches_name(&self, input: &str) -> bool {
        let input = input.to_lowercase();
        self.name.to_lowercase() == input
            || self.aliases.iter().any(|alias| alias.to_lowercase() == input)
    }

    /// `location_owner` is the owner of this exit's source location.
    pub fn is_visible_to(
        &self,
        character_id: CharacterId,
        location_owner: Option<CharacterId>,
    ) -> bool {
        match self.visibility {
            ExitVisibility::All => true,
            ExitVisibility::Owner => location_owner == Some(character_id),
            ExitVisibility::List => self.visible_to.contains(&character_id),
        }
    }

    /// The return exit for a bidirectional exit with a return name.
    ///
    /// Endpoints and names are swapped. Visibility list and lock data are
    /// copied so the pair never shares mutable state.
    pub fn reverse(&self, now: DateTime<Utc>) -> Option<Exit> {
        if !self.bidirectional || self.return_name.is_empty() {
            return None;
        }
        Some(Exit {
            id: ExitId::new(),
            from_location_id: self.to_location_id,
            to_location_id: self.from_location_id,
            name: self.return_name.clone(),
            aliases: Vec::new(),
            bidirectional: true,
            return_name: self.name.clone(),
            visibility: self.visibility,
            visible_to: self.visible_to.clone(),
            lock: self.lock.clone(),
            created_at: now,
        })
    }

    /// True when this exit is `other`'s counterpart: bidirectional, running
    /// the opposite way and named after `other`'s return name. An exit that
    /// only carries the return name as an alias is not a counterpart.
    pub fn is_return_of(&self, other: &Exit) -> bool {
        self.bidirectional
            && self.from_location_id == other.to_location_id
            && self.to_location_id == other.from_location_id
            && self.name.to_lowercase() == other.return_name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn north() -> Exit {
        Exit::new(LocationId::new(), LocationId::new(), "north", Utc::now()).unwrap()
    }

    mod constructor {
        use super::*;

        #[test]
        fn defaults_to_visible_to_all() {
            let exit = north();
            assert_eq!(exit.visibility(), ExitVisibility::All);
            assert!(!exit.is_bidirectional());
            assert!(!exit.is_locked());
        }

        #[test]
        fn rejects_self_loop() {
            let here = LocationId::new();
            let err = Exit::new(here, here, "loop", Utc::now()).unwrap_err();
            assert_eq!(err, DomainError::SelfReferentialExit);
        }

        #[test]
        fn rejects_empty_name() {
            let err = Exit::new(LocationId::new(), LocationId::new(), "", Utc::now()).unwrap_err();
            assert_eq!(err.field(), Some("name"));
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn nil_id_is_rejected_first() {
            let exit = north().with_id(ExitId::nil()).with_aliases([""]);
            assert_eq!(exit.validate().unwrap_err().field(), Some("id"));
        }

        #[test]
        fn nil_endpoints_are_not_a_self_loop() {
            let exit = Exit::new(LocationId::nil(), LocationId::nil(), "gap", Utc::now());
            assert!(exit.is_ok());
        }

        #[test]
        fn lock_data_checked_only_when_locked() {
            let exit = north().with_lock(ExitLock::new(LockType::Key).with_data("9lives", json!(1)));
            assert_eq!(exit.validate().unwrap_err().field(), Some("lock_data"));
        }

        #[test]
        fn visible_to_checked_only_for_list_visibility() {
            let id = CharacterId::new();
            let exit = north().with_visible_to(vec![id, id]);
            assert_eq!(exit.validate().unwrap_err().field(), Some("visible_to"));
        }

        #[test]
        fn enum_parsing_rejects_unknown_values() {
            assert_eq!(
                "hidden".parse::<ExitVisibility>().unwrap_err(),
                DomainError::InvalidVisibility("hidden".into())
            );
            assert_eq!(
                "rune".parse::<LockType>().unwrap_err(),
                DomainError::InvalidLockType("rune".into())
            );
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn matches_name_and_aliases_ignoring_case() {
            let exit = north().with_aliases(["n", "Up The Hill"]);
            assert!(exit.matches_name("NORTH"));
            assert!(exit.matches_name("N"));
            assert!(exit.matches_name("up the hill"));
            assert!(!exit.matches_name("south"));
        }

        #[test]
        fn visibility_rules() {
            let owner = CharacterId::new();
            let guest = CharacterId::new();

            assert!(north().is_visible_to(guest, None));

            let owner_only = north().with_visibility(ExitVisibility::Owner);
            assert!(owner_only.is_visible_to(owner, Some(owner)));
            assert!(!owner_only.is_visible_to(guest, Some(owner)));
            assert!(!owner_only.is_visible_to(owner, None));

            let listed = north().with_visible_to(vec![guest]);
            assert!(listed.is_visible_to(guest, None));
            assert!(!listed.is_visible_to(owner, Some(owner)));
        }
    }

    mod reverse {
        use super::*;

        #[test]
        fn none_unless_bidirectional_with_return_name() {
            assert!(north().reverse(Utc::now()).is_none());
            assert!(north().with_return("").reverse(Utc::now()).is_none());
        }

        #[test]
        fn swaps_endpoints_and_names() {
            let exit = north().with_return("south");
            let back = exit.reverse(Utc::now()).unwrap();
            assert_eq!(back.from_location_id(), exit.to_location_id());
            assert_eq!(back.to_location_id(), exit.from_location_id());
            assert_eq!(back.name(), "south");
            assert_eq!(back.return_name(), "north");
            assert!(back.is_bidirectional());
            assert_ne!(back.id(), exit.id());
            assert!(back.is_return_of(&exit));
        }

        #[test]
        fn return_match_needs_name_and_pairing() {
            let exit = north().with_return("south");
            let back = exit.reverse(Utc::now()).unwrap();

            let aliased = Exit::new(back.from_location_id(), back.to_location_id(), "gate", Utc::now())
                .unwrap()
                .with_aliases(["south"])
                .with_return("north");
            assert!(!aliased.is_return_of(&exit));

            let one_way =
                Exit::new(back.from_location_id(), back.to_location_id(), "South", Utc::now()).unwrap();
            assert!(!one_way.is_return_of(&exit));

            let shouting = one_way.with_return("north");
            assert!(shouting.is_return_of(&exit));
        }

        #[test]
        fn copies_lock_data_and_visible_to() {
            let watcher = CharacterId::new();
            let mut exit = north()
                .with_return("south")
                .with_visible_to(vec![watcher])
                .with_lock(ExitLock::new(LockType::Password).with_data("hint", "swordfish"));
            let back = exit.reverse(Utc::now()).unwrap();

            exit.set_lock(Some(ExitLock::new(LockType::Key)));
            let lock = back.lock().unwrap();
            assert_eq!(lock.lock_type, LockType::Password);
            assert_eq!(lock.data.get("hint"), Some(&json!("swordfish")));
            assert_eq!(back.visible_to(), &[watcher]);
        }
    }
}
