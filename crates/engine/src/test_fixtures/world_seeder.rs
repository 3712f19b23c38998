//! World seeder for populating the in-memory world through the service.
//!
//! Everything is created as the system subject, so seeding never depends on
//! the grant table. Entities are looked up afterwards by name.

use std::collections::HashMap;

use mushworld_domain::{
    Character, CharacterId, Containment, Exit, ExitId, Location, LocationId, LocationType, Object,
    ObjectId, PlayerId,
};

use super::fixed_now;
use crate::app::App;
use crate::infrastructure::grants::SYSTEM_SUBJECT;
use crate::request_context::RequestContext;

// =============================================================================
// SeededWorld - names to ids
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct SeededWorld {
    location_by_name: HashMap<String, LocationId>,
    character_by_name: HashMap<String, CharacterId>,
    object_by_name: HashMap<String, ObjectId>,
    exit_by_name: HashMap<String, ExitId>,
}

impl SeededWorld {
    /// Get a location ID by name. Panics when it was never seeded.
    pub fn location(&self, name: &str) -> LocationId {
        self.location_by_name[name]
    }

    /// Get a character ID by name, as given before normalization.
    pub fn character(&self, name: &str) -> CharacterId {
        self.character_by_name[name]
    }

    pub fn object(&self, name: &str) -> ObjectId {
        self.object_by_name[name]
    }

    pub fn exit(&self, name: &str) -> ExitId {
        self.exit_by_name[name]
    }
}

// =============================================================================
// WorldSeeder
// =============================================================================

pub struct WorldSeeder<'a> {
    app: &'a App,
    ctx: RequestContext,
    world: SeededWorld,
}

impl<'a> WorldSeeder<'a> {
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            ctx: RequestContext::new(),
            world: SeededWorld::default(),
        }
    }

    /// Persistent location with a generated description.
    pub async fn location(self, name: &str) -> Self {
        self.location_of_type(name, LocationType::Persistent).await
    }

    pub async fn location_of_type(mut self, name: &str, location_type: LocationType) -> Self {
        let location = Location::new(location_type, name, format!("You are in {}.", name), fixed_now());
        let location = self
            .app
            .world_service
            .create_location(&self.ctx, SYSTEM_SUBJECT, location)
            .await
            .unwrap_or_else(|e| panic!("seeding location {name}: {e}"));
        self.world
            .location_by_name
            .insert(name.to_string(), location.id());
        self
    }

    /// Character, optionally already standing in a seeded location.
    pub async fn character(mut self, name: &str, at: Option<&str>) -> Self {
        let mut character = Character::new(PlayerId::new(), name, fixed_now())
            .unwrap_or_else(|e| panic!("building character {name}: {e}"));
        if let Some(location) = at {
            character = character.with_location(self.world.location(location));
        }
        let character = self
            .app
            .world_service
            .create_character(&self.ctx, SYSTEM_SUBJECT, character)
            .await
            .unwrap_or_else(|e| panic!("seeding character {name}: {e}"));
        self.world
            .character_by_name
            .insert(name.to_string(), character.id());
        self
    }

    /// Object lying in a seeded location.
    pub async fn object_at(self, name: &str, location: &str, is_container: bool) -> Self {
        let containment = Containment::in_location(self.world.location(location));
        self.object(name, containment, is_container).await
    }

    /// Object carried by a seeded character.
    pub async fn object_held_by(self, name: &str, character: &str) -> Self {
        let containment = Containment::held_by(self.world.character(character));
        self.object(name, containment, false).await
    }

    async fn object(mut self, name: &str, containment: Containment, is_container: bool) -> Self {
        let object = Object::new(name, containment, fixed_now())
            .unwrap_or_else(|e| panic!("building object {name}: {e}"))
            .with_container(is_container);
        let object = self
            .app
            .world_service
            .create_object(&self.ctx, SYSTEM_SUBJECT, object)
            .await
            .unwrap_or_else(|e| panic!("seeding object {name}: {e}"));
        self.world.object_by_name.insert(name.to_string(), object.id());
        self
    }

    /// Exit between two seeded locations. A return name makes it
    /// bidirectional.
    pub async fn exit(mut self, from: &str, to: &str, name: &str, return_name: Option<&str>) -> Self {
        let mut exit = Exit::new(self.world.location(from), self.world.location(to), name, fixed_now())
            .unwrap_or_else(|e| panic!("building exit {name}: {e}"));
        if let Some(return_name) = return_name {
            exit = exit.with_return(return_name);
        }
        let exit = self
            .app
            .world_service
            .create_exit(&self.ctx, SYSTEM_SUBJECT, exit)
            .await
            .unwrap_or_else(|e| panic!("seeding exit {name}: {e}"));
        self.world.exit_by_name.insert(name.to_string(), exit.id());
        self
    }

    pub fn finish(self) -> SeededWorld {
        self.world
    }
}
