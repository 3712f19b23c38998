//! In-memory location repository.

use async_trait::async_trait;
use mushworld_domain::*;

use super::store::InMemoryWorld;
use crate::infrastructure::ports::{LocationRepo, RepoError};

pub struct InMemoryLocationRepo {
    world: InMemoryWorld,
}

impl InMemoryLocationRepo {
    pub fn new(world: InMemoryWorld) -> Self {
        Self { world }
    }
}

fn sorted(mut locations: Vec<Location>) -> Vec<Location> {
    locations.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.name().cmp(b.name())));
    locations
}

#[async_trait]
impl LocationRepo for InMemoryLocationRepo {
    async fn get(&self, id: LocationId) -> Result<Location, RepoError> {
        self.world.tables()?.location(id).cloned()
    }

    async fn create(&self, location: &Location) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        if tables.locations.contains_key(&location.id()) {
            return Err(RepoError::constraint(format!(
                "location {} already exists",
                location.id()
            )));
        }
        tables.locations.insert(location.id(), location.clone());
        Ok(())
    }

    async fn update(&self, location: &Location) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        match tables.locations.get_mut(&location.id()) {
            Some(stored) => {
                *stored = location.clone();
                Ok(())
            }
            None => Err(RepoError::not_found("Location", location.id())),
        }
    }

    /// Exits touching the location and its scene roster go with it;
    /// characters standing there are left out of the world.
    async fn delete(&self, id: LocationId) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        if tables.locations.remove(&id).is_none() {
            return Err(RepoError::not_found("Location", id));
        }
        tables
            .exits
            .retain(|_, exit| exit.from_location_id() != id && exit.to_location_id() != id);
        tables.participants.remove(&id);
        for character in tables.characters.values_mut() {
            if character.location_id() == Some(id) {
                character
                    .set_location(None)
                    .map_err(|e| RepoError::database("delete", e))?;
            }
        }
        Ok(())
    }

    async fn list_by_type(&self, location_type: LocationType) -> Result<Vec<Location>, RepoError> {
        let tables = self.world.tables()?;
        Ok(sorted(
            tables
                .locations
                .values()
                .filter(|l| l.location_type() == location_type)
                .cloned()
                .collect(),
        ))
    }

    async fn get_shadowed_by(&self, id: LocationId) -> Result<Vec<Location>, RepoError> {
        let tables = self.world.tables()?;
        Ok(sorted(
            tables
                .locations
                .values()
                .filter(|l| l.shadows_id() == Some(id))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_name(&self, name: &str) -> Result<Location, RepoError> {
        let wanted = name.to_lowercase();
        let tables = self.world.tables()?;
        let matches = sorted(
            tables
                .locations
                .values()
                .filter(|l| l.name().to_lowercase() == wanted)
                .cloned()
                .collect(),
        );
        matches
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::not_found("Location", name))
    }
}
