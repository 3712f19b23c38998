//! Repository port traits for world storage.
//!
//! Every method signals a missing entity with [`RepoError::NotFound`] so the
//! service can tell "not there" apart from storage trouble.

use async_trait::async_trait;
use mushworld_domain::*;

use super::error::RepoError;

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepo: Send + Sync {
    async fn get(&self, id: LocationId) -> Result<Location, RepoError>;
    async fn create(&self, location: &Location) -> Result<(), RepoError>;
    async fn update(&self, location: &Location) -> Result<(), RepoError>;
    async fn delete(&self, id: LocationId) -> Result<(), RepoError>;
    async fn list_by_type(&self, location_type: LocationType) -> Result<Vec<Location>, RepoError>;
    /// Scenes shadowing the given location.
    async fn get_shadowed_by(&self, id: LocationId) -> Result<Vec<Location>, RepoError>;
    async fn find_by_name(&self, name: &str) -> Result<Location, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExitRepo: Send + Sync {
    async fn get(&self, id: ExitId) -> Result<Exit, RepoError>;
    /// Stores a single exit. Return exits are created separately.
    async fn create(&self, exit: &Exit) -> Result<(), RepoError>;
    async fn update(&self, exit: &Exit) -> Result<(), RepoError>;
    async fn delete(&self, id: ExitId) -> Result<(), RepoError>;
    async fn list_from_location(&self, location_id: LocationId) -> Result<Vec<Exit>, RepoError>;
    /// Exact, case-insensitive match on name or alias.
    async fn find_by_name(&self, location_id: LocationId, name: &str) -> Result<Exit, RepoError>;
    /// Best fuzzy match scoring at least `threshold` (0.0 to 1.0).
    async fn find_by_similarity(
        &self,
        location_id: LocationId,
        name: &str,
        threshold: f64,
    ) -> Result<Exit, RepoError>;
    /// Exits visible to `character_id`. The location owner is read in the
    /// same operation as the exits.
    async fn list_visible_exits(
        &self,
        location_id: LocationId,
        character_id: CharacterId,
    ) -> Result<Vec<Exit>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectRepo: Send + Sync {
    async fn get(&self, id: ObjectId) -> Result<Object, RepoError>;
    async fn create(&self, object: &Object) -> Result<(), RepoError>;
    async fn update(&self, object: &Object) -> Result<(), RepoError>;
    async fn delete(&self, id: ObjectId) -> Result<(), RepoError>;
    async fn list_at_location(&self, location_id: LocationId) -> Result<Vec<Object>, RepoError>;
    async fn list_held_by(&self, character_id: CharacterId) -> Result<Vec<Object>, RepoError>;
    async fn list_contained_in(&self, object_id: ObjectId) -> Result<Vec<Object>, RepoError>;
    /// Atomically replaces the object's containment.
    async fn move_object(&self, id: ObjectId, to: Containment) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Character, RepoError>;
    async fn create(&self, character: &Character) -> Result<(), RepoError>;
    async fn update(&self, character: &Character) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
    async fn get_by_location(
        &self,
        location_id: LocationId,
        options: ListOptions,
    ) -> Result<Vec<Character>, RepoError>;
    async fn update_location(
        &self,
        id: CharacterId,
        location_id: Option<LocationId>,
    ) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SceneRepo: Send + Sync {
    async fn add_participant(
        &self,
        scene_id: LocationId,
        character_id: CharacterId,
        role: ParticipantRole,
    ) -> Result<(), RepoError>;
    async fn remove_participant(
        &self,
        scene_id: LocationId,
        character_id: CharacterId,
    ) -> Result<(), RepoError>;
    async fn list_participants(&self, scene_id: LocationId) -> Result<Vec<SceneParticipant>, RepoError>;
    async fn get_scenes_for(&self, character_id: CharacterId) -> Result<Vec<Location>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyRepo: Send + Sync {
    async fn create(&self, property: &EntityProperty) -> Result<(), RepoError>;
    async fn get(&self, id: PropertyId) -> Result<EntityProperty, RepoError>;
    async fn list_by_parent(&self, parent: PropertyParent) -> Result<Vec<EntityProperty>, RepoError>;
    async fn update(&self, property: &EntityProperty) -> Result<(), RepoError>;
    async fn delete(&self, id: PropertyId) -> Result<(), RepoError>;
    /// Removes every property of `parent`. Succeeds when there are none.
    async fn delete_by_parent(&self, parent: PropertyParent) -> Result<(), RepoError>;
}
