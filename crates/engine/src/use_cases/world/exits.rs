//! Exit operations, including bidirectional pairing.

use mushworld_domain::{CharacterId, Exit, ExitId, LocationId};

use super::{Action, EntityKind, Operation, ResourceKind, WorldError, WorldResult, WorldService};
use crate::infrastructure::ports::{tx_work, TxAbort};
use crate::request_context::RequestContext;

const ENTITY: EntityKind = EntityKind::Exit;

/// Minimum score for a fuzzy exit-name match.
pub const EXIT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// What a successful exit deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDeletion {
    /// A one-way exit.
    Removed,
    /// A bidirectional exit and its return exit.
    PairRemoved { return_exit_id: ExitId },
    /// A bidirectional exit whose return exit was already gone.
    ReturnMissing,
}

impl WorldService {
    pub async fn get_exit(&self, ctx: &RequestContext, subject: &str, id: ExitId) -> WorldResult<Exit> {
        let repo = self.exits(ENTITY, Operation::Get)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Exit.resource(id), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::Get, id, repo.get(id)).await
    }

    /// Stores a new exit. A bidirectional exit with a return name gets its
    /// return exit created in the same transaction.
    pub async fn create_exit(
        &self,
        ctx: &RequestContext,
        subject: &str,
        mut exit: Exit,
    ) -> WorldResult<Exit> {
        let repo = self.exits(ENTITY, Operation::Create)?;
        let paired = exit.is_bidirectional() && !exit.return_name().is_empty();
        let transactor = if paired {
            Some(self.transactor(ENTITY, Operation::Create)?)
        } else {
            None
        };

        self.check_access(ctx, subject, Action::Write, &ResourceKind::Exit.wildcard(), ENTITY)
            .await?;
        exit.validate_fields()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        exit.assign_id_if_nil();

        let (Some(transactor), Some(reverse)) = (transactor, exit.reverse(self.clock.now())) else {
            Self::stored(ctx, ENTITY, Operation::Create, exit.id(), repo.create(&exit)).await?;
            return Ok(exit);
        };
        reverse
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;

        let (forward, backward) = (&exit, &reverse);
        let work = tx_work(move || async move {
            repo.create(forward)
                .await
                .map_err(|e| TxAbort::new("create_exit", e))?;
            repo.create(backward)
                .await
                .map_err(|e| TxAbort::new("create_return_exit", e))
        });
        let result = ctx.run(transactor.in_transaction(work)).await;
        match result {
            Ok(Ok(())) => Ok(exit),
            Ok(Err(tx)) => Err(WorldError::from_transaction(ENTITY, Operation::Create, exit.id(), tx, &[])),
            Err(interrupted) => Err(WorldError::interrupted(ENTITY, Operation::Create, interrupted)),
        }
    }

    pub async fn update_exit(&self, ctx: &RequestContext, subject: &str, exit: &Exit) -> WorldResult<()> {
        let repo = self.exits(ENTITY, Operation::Update)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Exit.resource(exit.id()), ENTITY)
            .await?;
        exit.validate().map_err(|e| WorldError::invalid(ENTITY, e))?;
        Self::stored(ctx, ENTITY, Operation::Update, exit.id(), repo.update(exit)).await
    }

    /// Deletes an exit and, for a bidirectional exit, its return exit.
    ///
    /// A return exit that no longer exists is not an error. Any other failure
    /// while removing it rolls back the whole deletion.
    pub async fn delete_exit(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: ExitId,
    ) -> WorldResult<ExitDeletion> {
        let repo = self.exits(ENTITY, Operation::Delete)?;
        let transactor = self.transactor(ENTITY, Operation::Delete)?;
        self.check_access(ctx, subject, Action::Delete, &ResourceKind::Exit.resource(id), ENTITY)
            .await?;

        let mut outcome = ExitDeletion::Removed;
        let result = {
            let outcome = &mut outcome;
            let work = tx_work(move || async move {
                let exit = repo
                    .get(id)
                    .await
                    .map_err(|e| TxAbort::new("get_exit", e))?;
                repo.delete(id)
                    .await
                    .map_err(|e| TxAbort::new("delete_exit", e))?;
                if !exit.is_bidirectional() || exit.return_name().is_empty() {
                    return Ok(());
                }

                match repo.find_by_name(exit.to_location_id(), exit.return_name()).await {
                    Ok(counterpart) if counterpart.is_return_of(&exit) => {
                        repo.delete(counterpart.id())
                            .await
                            .map_err(|e| TxAbort::new("delete_return_exit", e))?;
                        *outcome = ExitDeletion::PairRemoved {
                            return_exit_id: counterpart.id(),
                        };
                    }
                    Ok(_) => {
                        tracing::info!(
                            exit_id = %id,
                            to_location_id = %exit.to_location_id(),
                            return_name = exit.return_name(),
                            "exit answering to the return name is not its counterpart, leaving it in place"
                        );
                        *outcome = ExitDeletion::ReturnMissing;
                    }
                    Err(e) if e.is_not_found() => {
                        tracing::info!(
                            exit_id = %id,
                            to_location_id = %exit.to_location_id(),
                            return_name = exit.return_name(),
                            "return exit already deleted"
                        );
                        *outcome = ExitDeletion::ReturnMissing;
                    }
                    Err(e) => return Err(TxAbort::new("find_return_exit", e)),
                }
                Ok(())
            });
            ctx.run(transactor.in_transaction(work)).await
        };

        match result {
            Ok(Ok(())) => Ok(outcome),
            Ok(Err(tx)) => {
                let err = WorldError::from_transaction(
                    ENTITY,
                    Operation::Delete,
                    id,
                    tx,
                    &["get_exit", "delete_exit"],
                );
                if let WorldError::TransactionFailed { step, source, .. } = &err {
                    tracing::error!(exit_id = %id, step, error = %source, "exit delete rolled back");
                }
                Err(err)
            }
            Err(interrupted) => Err(WorldError::interrupted(ENTITY, Operation::Delete, interrupted)),
        }
    }

    /// All exits leaving `location_id`.
    pub async fn get_exits_by_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        location_id: LocationId,
    ) -> WorldResult<Vec<Exit>> {
        let repo = self.exits(ENTITY, Operation::List)?;
        self.check_access(
            ctx,
            subject,
            Action::Read,
            &ResourceKind::Location.resource(location_id),
            ENTITY,
        )
        .await?;
        Self::stored(ctx, ENTITY, Operation::List, location_id, repo.list_from_location(location_id))
            .await
    }

    /// Exits leaving `location_id` that `character_id` can see.
    pub async fn list_visible_exits(
        &self,
        ctx: &RequestContext,
        subject: &str,
        location_id: LocationId,
        character_id: CharacterId,
    ) -> WorldResult<Vec<Exit>> {
        let repo = self.exits(ENTITY, Operation::List)?;
        self.check_access(
            ctx,
            subject,
            Action::Read,
            &ResourceKind::Location.resource(location_id),
            ENTITY,
        )
        .await?;
        Self::stored(
            ctx,
            ENTITY,
            Operation::List,
            location_id,
            repo.list_visible_exits(location_id, character_id),
        )
        .await
    }

    /// Resolves player input to an exit: exact name or alias first, then the
    /// closest fuzzy match.
    pub async fn find_exit(
        &self,
        ctx: &RequestContext,
        subject: &str,
        location_id: LocationId,
        name: &str,
    ) -> WorldResult<Exit> {
        let repo = self.exits(ENTITY, Operation::Find)?;
        self.check_access(
            ctx,
            subject,
            Action::Read,
            &ResourceKind::Location.resource(location_id),
            ENTITY,
        )
        .await?;

        match Self::stored(ctx, ENTITY, Operation::Find, name, repo.find_by_name(location_id, name)).await {
            Err(WorldError::NotFound { .. }) => {}
            other => return other,
        }
        Self::stored(
            ctx,
            ENTITY,
            Operation::Find,
            name,
            repo.find_by_similarity(location_id, name, EXIT_SIMILARITY_THRESHOLD),
        )
        .await
    }
}
