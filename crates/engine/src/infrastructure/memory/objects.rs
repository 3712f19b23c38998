//! In-memory object repository with containment checks.

use async_trait::async_trait;
use mushworld_domain::*;

use super::store::{InMemoryWorld, Tables};
use crate::infrastructure::ports::{ObjectRepo, RepoError};

pub struct InMemoryObjectRepo {
    world: InMemoryWorld,
}

impl InMemoryObjectRepo {
    pub fn new(world: InMemoryWorld) -> Self {
        Self { world }
    }

    fn list_where(&self, keep: impl Fn(&Containment) -> bool) -> Result<Vec<Object>, RepoError> {
        let mut objects: Vec<Object> = self
            .world
            .tables()?
            .objects
            .values()
            .filter(|o| keep(&o.containment()))
            .cloned()
            .collect();
        objects.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.name().cmp(b.name())));
        Ok(objects)
    }
}

/// Checks that `object_id` may be placed at `to`.
fn check_placement(
    tables: &Tables,
    object_id: ObjectId,
    to: &Containment,
    max_depth: usize,
) -> Result<(), RepoError> {
    to.validate().map_err(RepoError::constraint)?;

    if let Some(location_id) = to.location_id {
        if !tables.locations.contains_key(&location_id) {
            return Err(RepoError::constraint(format!(
                "destination location {location_id} does not exist"
            )));
        }
    }
    if let Some(character_id) = to.character_id {
        if !tables.characters.contains_key(&character_id) {
            return Err(RepoError::constraint(format!(
                "destination character {character_id} does not exist"
            )));
        }
    }
    if let Some(container_id) = to.object_id {
        if container_id == object_id {
            return Err(RepoError::constraint("object cannot contain itself"));
        }
        let container = tables.objects.get(&container_id).ok_or_else(|| {
            RepoError::constraint(format!("destination object {container_id} does not exist"))
        })?;
        if !container.is_container() {
            return Err(RepoError::constraint(format!(
                "object {container_id} is not a container"
            )));
        }
        let ancestors = tables.ancestors(container_id);
        if ancestors.contains(&object_id) {
            return Err(RepoError::constraint(format!(
                "moving {object_id} into {container_id} would create a cycle"
            )));
        }
        let depth = ancestors.len() + 1 + tables.subtree_height(object_id);
        if depth > max_depth {
            return Err(RepoError::constraint(format!(
                "nesting depth {depth} exceeds maximum of {max_depth}"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ObjectRepo for InMemoryObjectRepo {
    async fn get(&self, id: ObjectId) -> Result<Object, RepoError> {
        self.world.tables()?.object(id).cloned()
    }

    async fn create(&self, object: &Object) -> Result<(), RepoError> {
        let max_depth = self.world.max_nesting_depth();
        let mut tables = self.world.tables_mut()?;
        if tables.objects.contains_key(&object.id()) {
            return Err(RepoError::constraint(format!("object {} already exists", object.id())));
        }
        check_placement(&tables, object.id(), &object.containment(), max_depth)?;
        tables.objects.insert(object.id(), object.clone());
        Ok(())
    }

    async fn update(&self, object: &Object) -> Result<(), RepoError> {
        let max_depth = self.world.max_nesting_depth();
        let mut tables = self.world.tables_mut()?;
        let stored = tables.object(object.id())?;
        if stored.containment() != object.containment() {
            check_placement(&tables, object.id(), &object.containment(), max_depth)?;
        }
        tables.objects.insert(object.id(), object.clone());
        Ok(())
    }

    /// Contents of a deleted container drop to the container's own place.
    async fn delete(&self, id: ObjectId) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        let removed = tables
            .objects
            .remove(&id)
            .ok_or_else(|| RepoError::not_found("Object", id))?;
        let parent_place = removed.containment();
        for object in tables.objects.values_mut() {
            if object.containment().object_id == Some(id) {
                object
                    .set_containment(parent_place)
                    .map_err(|e| RepoError::database("delete_object", e))?;
            }
        }
        Ok(())
    }

    async fn list_at_location(&self, location_id: LocationId) -> Result<Vec<Object>, RepoError> {
        self.list_where(|c| c.location_id == Some(location_id))
    }

    async fn list_held_by(&self, character_id: CharacterId) -> Result<Vec<Object>, RepoError> {
        self.list_where(|c| c.character_id == Some(character_id))
    }

    async fn list_contained_in(&self, object_id: ObjectId) -> Result<Vec<Object>, RepoError> {
        self.list_where(|c| c.object_id == Some(object_id))
    }

    async fn move_object(&self, id: ObjectId, to: Containment) -> Result<(), RepoError> {
        let max_depth = self.world.max_nesting_depth();
        let mut tables = self.world.tables_mut()?;
        tables.object(id)?;
        check_placement(&tables, id, &to, max_depth)?;
        let object = tables
            .objects
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("Object", id))?;
        object
            .set_containment(to)
            .map_err(RepoError::constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Fixture {
        world: InMemoryWorld,
        repo: InMemoryObjectRepo,
        room: LocationId,
    }

    fn fixture(max_depth: usize) -> Fixture {
        let world = InMemoryWorld::with_max_nesting_depth(max_depth);
        let room = Location::new(LocationType::Persistent, "Room", "", Utc::now());
        let room_id = room.id();
        world.write().locations.insert(room_id, room);
        Fixture {
            repo: InMemoryObjectRepo::new(world.clone()),
            world,
            room: room_id,
        }
    }

    async fn place(f: &Fixture, name: &str, at: Containment, container: bool) -> ObjectId {
        let object = Object::new(name, at, Utc::now()).unwrap().with_container(container);
        f.repo.create(&object).await.unwrap();
        object.id()
    }

    #[tokio::test]
    async fn move_into_container() {
        let f = fixture(20);
        let chest = place(&f, "chest", Containment::in_location(f.room), true).await;
        let coin = place(&f, "coin", Containment::in_location(f.room), false).await;

        f.repo.move_object(coin, Containment::inside(chest)).await.unwrap();

        let inside = f.repo.list_contained_in(chest).await.unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].id(), coin);
        assert_eq!(f.repo.list_at_location(f.room).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_non_container_and_self() {
        let f = fixture(20);
        let rock = place(&f, "rock", Containment::in_location(f.room), false).await;
        let bag = place(&f, "bag", Containment::in_location(f.room), true).await;

        let err = f.repo.move_object(bag, Containment::inside(rock)).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
        let err = f.repo.move_object(bag, Containment::inside(bag)).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn rejects_cycles() {
        let f = fixture(20);
        let outer = place(&f, "outer", Containment::in_location(f.room), true).await;
        let inner = place(&f, "inner", Containment::inside(outer), true).await;

        let err = f.repo.move_object(outer, Containment::inside(inner)).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(msg) if msg.contains("cycle")));
    }

    #[tokio::test]
    async fn enforces_nesting_depth() {
        let f = fixture(1);
        let a = place(&f, "a", Containment::in_location(f.room), true).await;
        let b = place(&f, "b", Containment::inside(a), true).await;
        let c = place(&f, "c", Containment::in_location(f.room), true).await;

        let err = f.repo.move_object(c, Containment::inside(b)).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(msg) if msg.contains("depth")));
    }

    #[tokio::test]
    async fn missing_destination_is_a_constraint_violation() {
        let f = fixture(20);
        let coin = place(&f, "coin", Containment::in_location(f.room), false).await;

        let err = f
            .repo
            .move_object(coin, Containment::held_by(CharacterId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
        assert!(f
            .repo
            .move_object(ObjectId::new(), Containment::in_location(f.room))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn deleting_container_spills_contents() {
        let f = fixture(20);
        let chest = place(&f, "chest", Containment::in_location(f.room), true).await;
        let coin = place(&f, "coin", Containment::inside(chest), false).await;

        f.repo.delete(chest).await.unwrap();

        let coin = f.world.read().object(coin).cloned().unwrap();
        assert_eq!(coin.containment(), Containment::in_location(f.room));
    }
}
