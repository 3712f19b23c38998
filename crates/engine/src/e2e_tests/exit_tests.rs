//! E2E tests for exits.
//!
//! Tests verify:
//! - Deleting one side of a bidirectional exit removes both
//! - A failed return exit rolls the forward exit back
//! - Exits resolve by alias and by a close misspelling

use std::sync::Arc;

use async_trait::async_trait;
use mushworld_domain::{CharacterId, Exit, ExitId, LocationId};

use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::grants::SYSTEM_SUBJECT;
use crate::infrastructure::memory::InMemoryExitRepo;
use crate::infrastructure::ports::{ExitRepo, RepoError};
use crate::request_context::RequestContext;
use crate::test_fixtures::{fixed_now, test_app, world_seeder::WorldSeeder};
use crate::use_cases::{ErrorKind, ExitDeletion, WorldService, WorldServiceConfig};

#[tokio::test]
async fn test_deleting_bidirectional_exit_removes_both_sides() {
    let app = test_app();
    let ctx = RequestContext::new();
    let world = WorldSeeder::new(&app)
        .location("A")
        .await
        .location("B")
        .await
        .exit("A", "B", "forward", Some("back"))
        .await
        .finish();
    let (a, b) = (world.location("A"), world.location("B"));

    let back = app
        .world_service
        .find_exit(&ctx, SYSTEM_SUBJECT, b, "back")
        .await
        .expect("return exit should exist");
    assert_eq!(back.to_location_id(), a);
    assert_eq!(back.return_name(), "forward");

    let outcome = app
        .world_service
        .delete_exit(&ctx, SYSTEM_SUBJECT, world.exit("forward"))
        .await
        .expect("delete should succeed");
    assert_eq!(
        outcome,
        ExitDeletion::PairRemoved {
            return_exit_id: back.id()
        }
    );

    for location in [a, b] {
        let remaining = app
            .world_service
            .get_exits_by_location(&ctx, SYSTEM_SUBJECT, location)
            .await
            .unwrap();
        assert!(remaining.is_empty(), "orphan exit left at {location}");
    }
}

#[tokio::test]
async fn test_deleting_exit_whose_return_is_gone() {
    let app = test_app();
    let ctx = RequestContext::new();
    let world = WorldSeeder::new(&app)
        .location("A")
        .await
        .location("B")
        .await
        .exit("A", "B", "forward", Some("back"))
        .await
        .finish();
    let back = app
        .world_service
        .find_exit(&ctx, SYSTEM_SUBJECT, world.location("B"), "back")
        .await
        .unwrap();
    app.repositories.exit.delete(back.id()).await.unwrap();

    let outcome = app
        .world_service
        .delete_exit(&ctx, SYSTEM_SUBJECT, world.exit("forward"))
        .await
        .unwrap();

    assert_eq!(outcome, ExitDeletion::ReturnMissing);
}

/// Delegates to the in-memory repository but refuses to store one exit name
/// and can fail every lookup by name.
struct RefusingExitRepo {
    inner: InMemoryExitRepo,
    refused_name: &'static str,
    lookups_fail: bool,
}

impl RefusingExitRepo {
    fn over(app: &crate::App) -> Self {
        Self {
            inner: InMemoryExitRepo::new(app.world.clone()),
            refused_name: "",
            lookups_fail: false,
        }
    }
}

#[async_trait]
impl ExitRepo for RefusingExitRepo {
    async fn get(&self, id: ExitId) -> Result<Exit, RepoError> {
        self.inner.get(id).await
    }

    async fn create(&self, exit: &Exit) -> Result<(), RepoError> {
        if exit.name() == self.refused_name {
            return Err(RepoError::database("create", "write rejected"));
        }
        self.inner.create(exit).await
    }

    async fn update(&self, exit: &Exit) -> Result<(), RepoError> {
        self.inner.update(exit).await
    }

    async fn delete(&self, id: ExitId) -> Result<(), RepoError> {
        self.inner.delete(id).await
    }

    async fn list_from_location(&self, location_id: LocationId) -> Result<Vec<Exit>, RepoError> {
        self.inner.list_from_location(location_id).await
    }

    async fn find_by_name(&self, location_id: LocationId, name: &str) -> Result<Exit, RepoError> {
        if self.lookups_fail {
            return Err(RepoError::database("find_by_name", "index unavailable"));
        }
        self.inner.find_by_name(location_id, name).await
    }

    async fn find_by_similarity(
        &self,
        location_id: LocationId,
        name: &str,
        threshold: f64,
    ) -> Result<Exit, RepoError> {
        self.inner.find_by_similarity(location_id, name, threshold).await
    }

    async fn list_visible_exits(
        &self,
        location_id: LocationId,
        character_id: CharacterId,
    ) -> Result<Vec<Exit>, RepoError> {
        self.inner.list_visible_exits(location_id, character_id).await
    }
}

#[tokio::test]
async fn test_failed_return_exit_rolls_back_forward_exit() {
    let app = test_app();
    let ctx = RequestContext::new();
    let world = WorldSeeder::new(&app)
        .location("A")
        .await
        .location("B")
        .await
        .finish();
    let (a, b) = (world.location("A"), world.location("B"));

    let service = WorldService::new(
        WorldServiceConfig::new(app.grants.clone(), Arc::new(FixedClock(fixed_now())))
            .with_exits(Arc::new(RefusingExitRepo {
                refused_name: "back",
                ..RefusingExitRepo::over(&app)
            }))
            .with_transactor(app.repositories.transactor.clone()),
    );
    let exit = Exit::new(a, b, "forward", fixed_now())
        .unwrap()
        .with_return("back");

    let err = service
        .create_exit(&ctx, SYSTEM_SUBJECT, exit)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransactionFailed);
    assert_eq!(err.code(), "EXIT_CREATE_FAILED");
    assert!(app.repositories.exit.list_from_location(a).await.unwrap().is_empty());
    assert!(app.repositories.exit.list_from_location(b).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_return_lookup_keeps_primary_exit() {
    let app = test_app();
    let ctx = RequestContext::new();
    let world = WorldSeeder::new(&app)
        .location("A")
        .await
        .location("B")
        .await
        .exit("A", "B", "forward", Some("back"))
        .await
        .finish();
    let forward = world.exit("forward");

    let service = WorldService::new(
        WorldServiceConfig::new(app.grants.clone(), Arc::new(FixedClock(fixed_now())))
            .with_exits(Arc::new(RefusingExitRepo {
                lookups_fail: true,
                ..RefusingExitRepo::over(&app)
            }))
            .with_transactor(app.repositories.transactor.clone()),
    );

    let err = service
        .delete_exit(&ctx, SYSTEM_SUBJECT, forward)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransactionFailed);
    assert_eq!(err.code(), "EXIT_DELETE_FAILED");
    assert!(app.repositories.exit.get(forward).await.is_ok());
    assert_eq!(
        app.repositories
            .exit
            .list_from_location(world.location("B"))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_exit_lookup_by_alias_and_misspelling() {
    let app = test_app();
    let ctx = RequestContext::new();
    let world = WorldSeeder::new(&app)
        .location("Hall")
        .await
        .location("Tower")
        .await
        .finish();
    let hall = world.location("Hall");
    let stairs = Exit::new(hall, world.location("Tower"), "staircase", fixed_now())
        .unwrap()
        .with_aliases(["up"]);
    app.world_service
        .create_exit(&ctx, SYSTEM_SUBJECT, stairs)
        .await
        .unwrap();

    let by_alias = app.world_service.find_exit(&ctx, SYSTEM_SUBJECT, hall, "UP").await.unwrap();
    assert_eq!(by_alias.name(), "staircase");

    let by_typo = app
        .world_service
        .find_exit(&ctx, SYSTEM_SUBJECT, hall, "staircse")
        .await
        .unwrap();
    assert_eq!(by_typo.id(), by_alias.id());

    let err = app
        .world_service
        .find_exit(&ctx, SYSTEM_SUBJECT, hall, "xyzzy")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "EXIT_NOT_FOUND");
}
