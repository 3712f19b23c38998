//! In-memory character repository.

use async_trait::async_trait;
use mushworld_domain::*;

use super::store::InMemoryWorld;
use crate::infrastructure::ports::{CharacterRepo, RepoError};

pub struct InMemoryCharacterRepo {
    world: InMemoryWorld,
}

impl InMemoryCharacterRepo {
    pub fn new(world: InMemoryWorld) -> Self {
        Self { world }
    }
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Character, RepoError> {
        self.world.tables()?.character(id).cloned()
    }

    async fn create(&self, character: &Character) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        if tables.characters.contains_key(&character.id()) {
            return Err(RepoError::constraint(format!(
                "character {} already exists",
                character.id()
            )));
        }
        if let Some(location_id) = character.location_id() {
            tables.location(location_id)?;
        }
        tables.characters.insert(character.id(), character.clone());
        Ok(())
    }

    async fn update(&self, character: &Character) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        tables.character(character.id())?;
        tables.characters.insert(character.id(), character.clone());
        Ok(())
    }

    /// Objects the character carried are dropped where it stood.
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        let removed = tables
            .characters
            .remove(&id)
            .ok_or_else(|| RepoError::not_found("Character", id))?;
        for roster in tables.participants.values_mut() {
            roster.retain(|p| p.character_id != id);
        }
        if let Some(location_id) = removed.location_id() {
            for object in tables.objects.values_mut() {
                if object.is_held_by(id) {
                    object
                        .set_containment(Containment::in_location(location_id))
                        .map_err(|e| RepoError::database("delete_character", e))?;
                }
            }
        }
        Ok(())
    }

    async fn get_by_location(
        &self,
        location_id: LocationId,
        options: ListOptions,
    ) -> Result<Vec<Character>, RepoError> {
        let tables = self.world.tables()?;
        let mut present: Vec<Character> = tables
            .characters
            .values()
            .filter(|c| c.location_id() == Some(location_id))
            .cloned()
            .collect();
        present.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
        Ok(present
            .into_iter()
            .skip(options.offset as usize)
            .take(options.effective_limit() as usize)
            .collect())
    }

    async fn update_location(
        &self,
        id: CharacterId,
        location_id: Option<LocationId>,
    ) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        if let Some(location_id) = location_id {
            tables.location(location_id)?;
        }
        let character = tables
            .characters
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("Character", id))?;
        character
            .set_location(location_id)
            .map_err(RepoError::constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn seeded() -> (InMemoryWorld, InMemoryCharacterRepo, LocationId) {
        let world = InMemoryWorld::new();
        let hall = Location::new(LocationType::Persistent, "Hall", "", Utc::now());
        let hall_id = hall.id();
        world.write().locations.insert(hall_id, hall);
        (world.clone(), InMemoryCharacterRepo::new(world), hall_id)
    }

    fn named(name: &str) -> Character {
        Character::new(PlayerId::new(), name, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn pagination_orders_by_name() {
        let (_, repo, hall) = seeded();
        for name in ["Carol", "Alice", "Bob"] {
            repo.create(&named(name).with_location(hall)).await.unwrap();
        }

        let page = repo.get_by_location(hall, ListOptions::new(2, 1)).await.unwrap();
        let names: Vec<_> = page.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
    }

    #[tokio::test]
    async fn update_location_requires_existing_room() {
        let (_, repo, hall) = seeded();
        let alice = named("Alice");
        repo.create(&alice).await.unwrap();

        assert!(repo
            .update_location(alice.id(), Some(LocationId::new()))
            .await
            .unwrap_err()
            .is_not_found());
        repo.update_location(alice.id(), Some(hall)).await.unwrap();
        assert_eq!(repo.get(alice.id()).await.unwrap().location_id(), Some(hall));
        repo.update_location(alice.id(), None).await.unwrap();
        assert!(!repo.get(alice.id()).await.unwrap().is_in_world());
    }

    #[tokio::test]
    async fn delete_drops_carried_objects() {
        let (world, repo, hall) = seeded();
        let alice = named("Alice").with_location(hall);
        repo.create(&alice).await.unwrap();
        let lamp = Object::new("lamp", Containment::held_by(alice.id()), Utc::now()).unwrap();
        world.write().objects.insert(lamp.id(), lamp.clone());

        repo.delete(alice.id()).await.unwrap();

        let lamp = world.read().object(lamp.id()).cloned().unwrap();
        assert_eq!(lamp.containment(), Containment::in_location(hall));
        assert!(repo.get(alice.id()).await.unwrap_err().is_not_found());
    }
}
