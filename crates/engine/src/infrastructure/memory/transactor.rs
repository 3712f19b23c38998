//! Staged transactions over the in-memory tables.
//!
//! Work runs against a private copy of the tables. Commit writes back only
//! the rows the work changed and fails if another caller changed one of them
//! meanwhile. Abort, or dropping the work, discards the copy. Readers outside
//! the transaction never see staged rows.

use async_trait::async_trait;

use super::store::InMemoryWorld;
use crate::infrastructure::ports::{Transactor, TxError, TxWork};

pub struct InMemoryTransactor {
    world: InMemoryWorld,
}

impl InMemoryTransactor {
    pub fn new(world: InMemoryWorld) -> Self {
        Self { world }
    }
}

#[async_trait]
impl Transactor for InMemoryTransactor {
    async fn in_transaction(&self, work: TxWork<'_>) -> Result<(), TxError> {
        if self.world.in_transaction() {
            return Err(TxError::Begin("transaction already open on this task".into()));
        }
        let base = self.world.snapshot();
        let (outcome, staged) = self.world.stage(base.clone(), work()).await;
        if let Err(abort) = outcome {
            tracing::debug!(step = abort.step, "discarding staged writes");
            return Err(abort.into());
        }
        let rows = self
            .world
            .commit(&base, &staged)
            .map_err(|e| TxError::Commit(e.to_string()))?;
        tracing::debug!(rows, "committed in-memory transaction");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryLocationRepo;
    use crate::infrastructure::ports::{tx_work, LocationRepo, RepoError, TxAbort};
    use chrono::Utc;
    use mushworld_domain::{Location, LocationType};
    use std::sync::Arc;
    use std::time::Duration;

    fn room(name: &str) -> Location {
        Location::new(LocationType::Persistent, name, "", Utc::now())
    }

    #[tokio::test]
    async fn commit_keeps_writes() {
        let world = InMemoryWorld::new();
        let tx = InMemoryTransactor::new(world.clone());
        let hall = room("Hall");
        let hall_id = hall.id();
        let handle = &world;

        tx.in_transaction(tx_work(move || async move {
            handle.tables_mut().unwrap().locations.insert(hall_id, hall);
            Ok(())
        }))
        .await
        .unwrap();

        assert!(world.read().locations.contains_key(&hall_id));
    }

    #[tokio::test]
    async fn abort_discards_staged_writes() {
        let world = InMemoryWorld::new();
        let tx = InMemoryTransactor::new(world.clone());
        let hall = room("Hall");
        let handle = &world;

        let err = tx
            .in_transaction(tx_work(move || async move {
                handle.tables_mut().unwrap().locations.insert(hall.id(), hall);
                Err(TxAbort::new("second_step", RepoError::database("insert", "boom")))
            }))
            .await
            .unwrap_err();

        assert_eq!(err.step(), "second_step");
        assert!(world.read().locations.is_empty());
    }

    #[tokio::test]
    async fn dropped_work_rolls_back() {
        let world = InMemoryWorld::new();
        let tx = InMemoryTransactor::new(world.clone());
        let hall = room("Hall");
        let handle = &world;

        let pending = tx.in_transaction(tx_work(move || async move {
            handle.tables_mut().unwrap().locations.insert(hall.id(), hall);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }));
        let timed_out = tokio::time::timeout(Duration::from_millis(20), pending).await;

        assert!(timed_out.is_err());
        assert!(world.read().locations.is_empty());
    }

    #[tokio::test]
    async fn rollback_keeps_writes_made_outside_the_transaction() {
        let world = InMemoryWorld::new();
        let tx = Arc::new(InMemoryTransactor::new(world.clone()));
        let repo = InMemoryLocationRepo::new(world.clone());
        let doomed = room("Doomed");
        let bystander = room("Bystander");
        let staged_world = world.clone();

        let aborting = tokio::spawn({
            let tx = tx.clone();
            async move {
                tx.in_transaction(tx_work(move || async move {
                    staged_world.tables_mut().unwrap().locations.insert(doomed.id(), doomed);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Err(TxAbort::new("late_step", RepoError::database("late_step", "boom")))
                }))
                .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        repo.create(&bystander).await.unwrap();
        assert_eq!(world.read().locations.len(), 1, "staged row leaked to readers");

        let err = aborting.await.unwrap().unwrap_err();

        assert_eq!(err.step(), "late_step");
        assert!(repo.get(bystander.id()).await.is_ok());
        assert_eq!(world.read().locations.len(), 1);
    }

    #[tokio::test]
    async fn commit_fails_when_a_staged_row_changed_underneath() {
        let world = InMemoryWorld::new();
        let tx = InMemoryTransactor::new(world.clone());
        let repo = InMemoryLocationRepo::new(world.clone());
        let hall = room("Hall");
        repo.create(&hall).await.unwrap();
        let (staged_world, outside) = (world.clone(), world.clone());
        let mut renamed = hall.clone();
        renamed.set_name("Great Hall");

        let err = tx
            .in_transaction(tx_work(move || async move {
                staged_world.tables_mut().unwrap().locations.remove(&hall.id());
                outside.write().locations.insert(renamed.id(), renamed);
                Ok(())
            }))
            .await
            .unwrap_err();

        assert_eq!(err.step(), "commit");
        let stored = world.read().locations.values().next().map(|l| l.name().to_string());
        assert_eq!(stored.as_deref(), Some("Great Hall"));
    }

    #[tokio::test]
    async fn nested_transaction_is_refused() {
        let world = InMemoryWorld::new();
        let tx = InMemoryTransactor::new(world.clone());
        let inner = &tx;

        let err = tx
            .in_transaction(tx_work(move || async move {
                let nested = inner.in_transaction(tx_work(|| async { Ok(()) })).await;
                assert_eq!(nested.unwrap_err().step(), "begin");
                Err(TxAbort::new("after_nested", RepoError::database("nested", "stop")))
            }))
            .await
            .unwrap_err();

        assert_eq!(err.step(), "after_nested");
    }
}
