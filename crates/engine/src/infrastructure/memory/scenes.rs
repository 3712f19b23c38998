//! In-memory scene participation.

use async_trait::async_trait;
use mushworld_domain::*;

use super::store::{InMemoryWorld, Tables};
use crate::infrastructure::ports::{RepoError, SceneRepo};

pub struct InMemorySceneRepo {
    world: InMemoryWorld,
}

impl InMemorySceneRepo {
    pub fn new(world: InMemoryWorld) -> Self {
        Self { world }
    }
}

/// Only locations of type `scene` take participants.
fn require_scene(tables: &Tables, scene_id: LocationId) -> Result<(), RepoError> {
    match tables.locations.get(&scene_id) {
        Some(location) if location.location_type() == LocationType::Scene => Ok(()),
        _ => Err(RepoError::not_found("Scene", scene_id)),
    }
}

#[async_trait]
impl SceneRepo for InMemorySceneRepo {
    /// Adding an existing participant replaces their role.
    async fn add_participant(
        &self,
        scene_id: LocationId,
        character_id: CharacterId,
        role: ParticipantRole,
    ) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        require_scene(&tables, scene_id)?;
        tables.character(character_id)?;
        let roster = tables.participants.entry(scene_id).or_default();
        match roster.iter_mut().find(|p| p.character_id == character_id) {
            Some(existing) => existing.role = role,
            None => roster.push(SceneParticipant::new(character_id, role)),
        }
        Ok(())
    }

    async fn remove_participant(
        &self,
        scene_id: LocationId,
        character_id: CharacterId,
    ) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        require_scene(&tables, scene_id)?;
        let roster = tables.participants.entry(scene_id).or_default();
        let before = roster.len();
        roster.retain(|p| p.character_id != character_id);
        if roster.len() == before {
            return Err(RepoError::not_found("SceneParticipant", character_id));
        }
        Ok(())
    }

    async fn list_participants(&self, scene_id: LocationId) -> Result<Vec<SceneParticipant>, RepoError> {
        let tables = self.world.tables()?;
        require_scene(&tables, scene_id)?;
        Ok(tables.participants.get(&scene_id).cloned().unwrap_or_default())
    }

    async fn get_scenes_for(&self, character_id: CharacterId) -> Result<Vec<Location>, RepoError> {
        let tables = self.world.tables()?;
        let mut scenes: Vec<Location> = tables
            .participants
            .iter()
            .filter(|(_, roster)| roster.iter().any(|p| p.character_id == character_id))
            .filter_map(|(scene_id, _)| tables.locations.get(scene_id).cloned())
            .collect();
        scenes.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.name().cmp(b.name())));
        Ok(scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Fixture {
        repo: InMemorySceneRepo,
        scene: LocationId,
        room: LocationId,
        alice: CharacterId,
    }

    fn fixture() -> Fixture {
        let world = InMemoryWorld::new();
        let room = Location::new(LocationType::Persistent, "Parlour", "", Utc::now());
        let scene = Location::new(LocationType::Scene, "Tea", "", Utc::now()).with_shadows(room.id());
        let alice = Character::new(PlayerId::new(), "Alice", Utc::now()).unwrap();
        let (room_id, scene_id, alice_id) = (room.id(), scene.id(), alice.id());
        {
            let mut tables = world.write();
            tables.locations.insert(room_id, room);
            tables.locations.insert(scene_id, scene);
            tables.characters.insert(alice_id, alice);
        }
        Fixture {
            repo: InMemorySceneRepo::new(world),
            scene: scene_id,
            room: room_id,
            alice: alice_id,
        }
    }

    #[tokio::test]
    async fn add_upserts_role() {
        let f = fixture();
        f.repo.add_participant(f.scene, f.alice, ParticipantRole::Invited).await.unwrap();
        f.repo.add_participant(f.scene, f.alice, ParticipantRole::Member).await.unwrap();

        let roster = f.repo.list_participants(f.scene).await.unwrap();
        assert_eq!(roster, vec![SceneParticipant::new(f.alice, ParticipantRole::Member)]);

        let scenes = f.repo.get_scenes_for(f.alice).await.unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].id(), f.scene);
    }

    #[tokio::test]
    async fn non_scene_locations_are_not_scenes() {
        let f = fixture();
        let err = f
            .repo
            .add_participant(f.room, f.alice, ParticipantRole::Owner)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound { entity_type: "Scene", .. }));
    }

    #[tokio::test]
    async fn removing_a_stranger_is_not_found() {
        let f = fixture();
        assert!(f
            .repo
            .remove_participant(f.scene, CharacterId::new())
            .await
            .unwrap_err()
            .is_not_found());
    }
}
