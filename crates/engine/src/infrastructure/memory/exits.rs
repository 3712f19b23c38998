//! In-memory exit repository.
//!
//! Stores single exits only. Pairing bidirectional exits is the service's
//! job, inside its own transaction.

use async_trait::async_trait;
use mushworld_domain::*;

use super::similarity::similarity;
use super::store::{InMemoryWorld, Tables};
use crate::infrastructure::ports::{ExitRepo, RepoError};

pub struct InMemoryExitRepo {
    world: InMemoryWorld,
}

impl InMemoryExitRepo {
    pub fn new(world: InMemoryWorld) -> Self {
        Self { world }
    }
}

fn exits_from(tables: &Tables, location_id: LocationId) -> Vec<Exit> {
    let mut exits: Vec<Exit> = tables
        .exits
        .values()
        .filter(|e| e.from_location_id() == location_id)
        .cloned()
        .collect();
    exits.sort_by(|a, b| a.name().cmp(b.name()));
    exits
}

fn check_endpoints(tables: &Tables, exit: &Exit) -> Result<(), RepoError> {
    for endpoint in [exit.from_location_id(), exit.to_location_id()] {
        if !tables.locations.contains_key(&endpoint) {
            return Err(RepoError::constraint(format!(
                "exit {} references missing location {}",
                exit.id(),
                endpoint
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ExitRepo for InMemoryExitRepo {
    async fn get(&self, id: ExitId) -> Result<Exit, RepoError> {
        self.world
            .tables()?
            .exits
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("Exit", id))
    }

    async fn create(&self, exit: &Exit) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        if tables.exits.contains_key(&exit.id()) {
            return Err(RepoError::constraint(format!("exit {} already exists", exit.id())));
        }
        check_endpoints(&tables, exit)?;
        tables.exits.insert(exit.id(), exit.clone());
        Ok(())
    }

    async fn update(&self, exit: &Exit) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        if !tables.exits.contains_key(&exit.id()) {
            return Err(RepoError::not_found("Exit", exit.id()));
        }
        check_endpoints(&tables, exit)?;
        tables.exits.insert(exit.id(), exit.clone());
        Ok(())
    }

    async fn delete(&self, id: ExitId) -> Result<(), RepoError> {
        self.world
            .tables_mut()?
            .exits
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("Exit", id))
    }

    async fn list_from_location(&self, location_id: LocationId) -> Result<Vec<Exit>, RepoError> {
        Ok(exits_from(&*self.world.tables()?, location_id))
    }

    /// A name match wins over an alias match.
    async fn find_by_name(&self, location_id: LocationId, name: &str) -> Result<Exit, RepoError> {
        let wanted = name.to_lowercase();
        let mut matches: Vec<Exit> = exits_from(&*self.world.tables()?, location_id)
            .into_iter()
            .filter(|exit| exit.matches_name(name))
            .collect();
        matches.sort_by_key(|exit| exit.name().to_lowercase() != wanted);
        matches
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::not_found("Exit", name))
    }

    async fn find_by_similarity(
        &self,
        location_id: LocationId,
        name: &str,
        threshold: f64,
    ) -> Result<Exit, RepoError> {
        let score = |exit: &Exit| {
            std::iter::once(exit.name())
                .chain(exit.aliases().iter().map(String::as_str))
                .map(|candidate| similarity(name, candidate))
                .fold(0.0_f64, f64::max)
        };
        exits_from(&*self.world.tables()?, location_id)
            .into_iter()
            .map(|exit| (score(&exit), exit))
            .filter(|(s, _)| *s >= threshold)
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, exit)| exit)
            .ok_or_else(|| RepoError::not_found("Exit", name))
    }

    async fn list_visible_exits(
        &self,
        location_id: LocationId,
        character_id: CharacterId,
    ) -> Result<Vec<Exit>, RepoError> {
        // Owner and exits are read under one guard.
        let tables = self.world.tables()?;
        let owner = tables.location(location_id)?.owner_id();
        Ok(exits_from(&tables, location_id)
            .into_iter()
            .filter(|exit| exit.is_visible_to(character_id, owner))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Fixture {
        repo: InMemoryExitRepo,
        hall: LocationId,
        yard: LocationId,
        owner: CharacterId,
    }

    fn fixture() -> Fixture {
        let world = InMemoryWorld::new();
        let owner = CharacterId::new();
        let hall = Location::new(LocationType::Persistent, "Hall", "", Utc::now()).with_owner(owner);
        let yard = Location::new(LocationType::Persistent, "Yard", "", Utc::now());
        let (hall_id, yard_id) = (hall.id(), yard.id());
        {
            let mut tables = world.write();
            tables.locations.insert(hall_id, hall);
            tables.locations.insert(yard_id, yard);
        }
        Fixture {
            repo: InMemoryExitRepo::new(world),
            hall: hall_id,
            yard: yard_id,
            owner,
        }
    }

    #[tokio::test]
    async fn create_rejects_missing_endpoint() {
        let f = fixture();
        let exit = Exit::new(f.hall, LocationId::new(), "void", Utc::now()).unwrap();
        let err = f.repo.create(&exit).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn find_by_name_prefers_names_over_aliases() {
        let f = fixture();
        let gate = Exit::new(f.hall, f.yard, "gate", Utc::now())
            .unwrap()
            .with_aliases(["south"]);
        let south = Exit::new(f.hall, f.yard, "south", Utc::now()).unwrap();
        f.repo.create(&gate).await.unwrap();
        f.repo.create(&south).await.unwrap();

        assert_eq!(f.repo.find_by_name(f.hall, "SOUTH").await.unwrap().id(), south.id());
    }

    #[tokio::test]
    async fn find_by_name_matches_aliases() {
        let f = fixture();
        let exit = Exit::new(f.hall, f.yard, "north", Utc::now())
            .unwrap()
            .with_aliases(["n"]);
        f.repo.create(&exit).await.unwrap();

        assert_eq!(f.repo.find_by_name(f.hall, "N").await.unwrap().id(), exit.id());
        assert!(f.repo.find_by_name(f.yard, "north").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn similarity_respects_threshold() {
        let f = fixture();
        let exit = Exit::new(f.hall, f.yard, "outside", Utc::now()).unwrap();
        f.repo.create(&exit).await.unwrap();

        assert_eq!(
            f.repo.find_by_similarity(f.hall, "out", 0.3).await.unwrap().id(),
            exit.id()
        );
        assert!(f
            .repo
            .find_by_similarity(f.hall, "cellar", 0.3)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn visibility_filters_by_owner_and_list() {
        let f = fixture();
        let stranger = CharacterId::new();
        let public = Exit::new(f.hall, f.yard, "door", Utc::now()).unwrap();
        let private = Exit::new(f.hall, f.yard, "hatch", Utc::now())
            .unwrap()
            .with_visibility(ExitVisibility::Owner);
        let listed = Exit::new(f.hall, f.yard, "crack", Utc::now())
            .unwrap()
            .with_visible_to(vec![stranger]);
        for exit in [&public, &private, &listed] {
            f.repo.create(exit).await.unwrap();
        }

        let for_owner: Vec<_> = f
            .repo
            .list_visible_exits(f.hall, f.owner)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(for_owner, vec!["door", "hatch"]);

        let for_stranger: Vec<_> = f
            .repo
            .list_visible_exits(f.hall, stranger)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(for_stranger, vec!["crack", "door"]);
    }
}
