//! World service: authorization and orchestration for world entities.
//!
//! Every operation resolves the collaborators it needs, checks access with
//! the evaluator, validates input, calls storage and, for state changes that
//! subscribers care about, emits an event. All collaborator calls run under
//! the caller's [`RequestContext`].

mod access;
mod characters;
mod error;
mod examine;
mod exits;
mod locations;
mod objects;
mod properties;
mod scenes;


use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use mushworld_domain::PropertyParent;

use crate::infrastructure::emitter::{EventEmitter, PublisherMode, Requirement, RetryConfig};
use crate::infrastructure::ports::{
    AccessEvaluator, CharacterRepo, ClockPort, EventPublisher, ExitRepo, LocationRepo, ObjectRepo,
    tx_work, PropertyRepo, RepoError, SceneRepo, Transactor, TxAbort,
};
use crate::request_context::RequestContext;

pub use access::{Action, ResourceKind};
pub use error::{AccessFailure, EntityKind, ErrorKind, Operation, WorldError, WorldResult};
pub use exits::{ExitDeletion, EXIT_SIMILARITY_THRESHOLD};

/// Collaborators for [`WorldService`].
///
/// Only the access evaluator and clock are mandatory. Each operation checks
/// the optional collaborators it needs and reports a configuration error
/// when one is missing.
#[derive(Clone)]
pub struct WorldServiceConfig {
    pub access: Arc<dyn AccessEvaluator>,
    pub clock: Arc<dyn ClockPort>,
    pub locations: Option<Arc<dyn LocationRepo>>,
    pub exits: Option<Arc<dyn ExitRepo>>,
    pub objects: Option<Arc<dyn ObjectRepo>>,
    pub characters: Option<Arc<dyn CharacterRepo>>,
    pub scenes: Option<Arc<dyn SceneRepo>>,
    pub properties: Option<Arc<dyn PropertyRepo>>,
    pub transactor: Option<Arc<dyn Transactor>>,
    pub publisher: Option<Arc<dyn EventPublisher>>,
    pub publisher_mode: PublisherMode,
    pub retry: RetryConfig,
}

impl WorldServiceConfig {
    pub fn new(access: Arc<dyn AccessEvaluator>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            access,
            clock,
            locations: None,
            exits: None,
            objects: None,
            characters: None,
            scenes: None,
            properties: None,
            transactor: None,
            publisher: None,
            publisher_mode: PublisherMode::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_locations(mut self, repo: Arc<dyn LocationRepo>) -> Self {
        self.locations = Some(repo);
        self
    }

    pub fn with_exits(mut self, repo: Arc<dyn ExitRepo>) -> Self {
        self.exits = Some(repo);
        self
    }

    pub fn with_objects(mut self, repo: Arc<dyn ObjectRepo>) -> Self {
        self.objects = Some(repo);
        self
    }

    pub fn with_characters(mut self, repo: Arc<dyn CharacterRepo>) -> Self {
        self.characters = Some(repo);
        self
    }

    pub fn with_scenes(mut self, repo: Arc<dyn SceneRepo>) -> Self {
        self.scenes = Some(repo);
        self
    }

    pub fn with_properties(mut self, repo: Arc<dyn PropertyRepo>) -> Self {
        self.properties = Some(repo);
        self
    }

    pub fn with_transactor(mut self, transactor: Arc<dyn Transactor>) -> Self {
        self.transactor = Some(transactor);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_publisher_mode(mut self, mode: PublisherMode) -> Self {
        self.publisher_mode = mode;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

pub struct WorldService {
    access: Arc<dyn AccessEvaluator>,
    clock: Arc<dyn ClockPort>,
    locations: Option<Arc<dyn LocationRepo>>,
    exits: Option<Arc<dyn ExitRepo>>,
    objects: Option<Arc<dyn ObjectRepo>>,
    characters: Option<Arc<dyn CharacterRepo>>,
    scenes: Option<Arc<dyn SceneRepo>>,
    properties: Option<Arc<dyn PropertyRepo>>,
    transactor: Option<Arc<dyn Transactor>>,
    emitter: EventEmitter,
}

impl WorldService {
    pub fn new(config: WorldServiceConfig) -> Self {
        let emitter = EventEmitter::new(config.publisher, config.publisher_mode, config.retry);
        if emitter.is_degraded() {
            tracing::debug!(mode = ?emitter.mode(), "world service built without an event publisher");
        }
        Self {
            access: config.access,
            clock: config.clock,
            locations: config.locations,
            exits: config.exits,
            objects: config.objects,
            characters: config.characters,
            scenes: config.scenes,
            properties: config.properties,
            transactor: config.transactor,
            emitter,
        }
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    // =========================================================================
    // Collaborator resolution
    // =========================================================================

    fn locations(&self, entity: EntityKind, operation: Operation) -> WorldResult<&dyn LocationRepo> {
        self.locations
            .as_deref()
            .ok_or_else(|| WorldError::configuration(entity, operation, "location repository"))
    }

    fn exits(&self, entity: EntityKind, operation: Operation) -> WorldResult<&dyn ExitRepo> {
        self.exits
            .as_deref()
            .ok_or_else(|| WorldError::configuration(entity, operation, "exit repository"))
    }

    fn objects(&self, entity: EntityKind, operation: Operation) -> WorldResult<&dyn ObjectRepo> {
        self.objects
            .as_deref()
            .ok_or_else(|| WorldError::configuration(entity, operation, "object repository"))
    }

    fn characters(&self, entity: EntityKind, operation: Operation) -> WorldResult<&dyn CharacterRepo> {
        self.characters
            .as_deref()
            .ok_or_else(|| WorldError::configuration(entity, operation, "character repository"))
    }

    fn scenes(&self, entity: EntityKind, operation: Operation) -> WorldResult<&dyn SceneRepo> {
        self.scenes
            .as_deref()
            .ok_or_else(|| WorldError::configuration(entity, operation, "scene repository"))
    }

    fn properties(&self, entity: EntityKind, operation: Operation) -> WorldResult<&dyn PropertyRepo> {
        self.properties
            .as_deref()
            .ok_or_else(|| WorldError::configuration(entity, operation, "property repository"))
    }

    fn transactor(&self, entity: EntityKind, operation: Operation) -> WorldResult<&dyn Transactor> {
        self.transactor
            .as_deref()
            .ok_or_else(|| WorldError::configuration(entity, operation, "transactor"))
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    /// Runs a storage call under `ctx`, mapping "not found" to the entity's
    /// not-found error and everything else to an operation failure.
    async fn stored<T, F>(
        ctx: &RequestContext,
        entity: EntityKind,
        operation: Operation,
        id: impl ToString,
        call: F,
    ) -> WorldResult<T>
    where
        F: Future<Output = Result<T, RepoError>>,
    {
        match ctx.run(call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(WorldError::from_repo(entity, operation, id, e)),
            Err(interrupted) => Err(WorldError::interrupted(entity, operation, interrupted)),
        }
    }

    /// Like [`WorldService::stored`], but a missing entity is reported as
    /// `target` while other failures stay with `entity` and `operation`.
    async fn lookup<T, F>(
        ctx: &RequestContext,
        target: EntityKind,
        entity: EntityKind,
        operation: Operation,
        id: impl ToString,
        call: F,
    ) -> WorldResult<T>
    where
        F: Future<Output = Result<T, RepoError>>,
    {
        match ctx.run(call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_not_found() => Err(WorldError::from_repo(target, operation, id, e)),
            Ok(Err(e)) => Err(WorldError::from_repo(entity, operation, id, e)),
            Err(interrupted) => Err(WorldError::interrupted(entity, operation, interrupted)),
        }
    }

    /// Fails before any mutation when an operation's event could never be
    /// published.
    fn require_publisher(&self, entity: EntityKind, operation: Operation) -> WorldResult<()> {
        self.emitter
            .ensure_available(Requirement::Required)
            .map_err(|_| WorldError::configuration(entity, operation, "event publisher"))
    }

    /// Deletes an entity and all of its properties in one transaction.
    ///
    /// Both collaborators are resolved before access is checked. A repository
    /// without a transactor is refused, since a partial cascade would leave
    /// orphaned properties behind.
    async fn cascade_delete<'a>(
        &'a self,
        ctx: &RequestContext,
        subject: &str,
        entity: EntityKind,
        parent: PropertyParent,
        delete_entity: impl FnOnce() -> BoxFuture<'a, Result<(), RepoError>> + Send + 'a,
    ) -> WorldResult<()> {
        let properties = self.properties(entity, Operation::Delete)?;
        let transactor = self.transactor(entity, Operation::Delete)?;

        let resource = ResourceKind::from(parent).resource(parent.id());
        self.check_access(ctx, subject, Action::Delete, &resource, entity)
            .await?;

        let work = tx_work(move || async move {
            properties
                .delete_by_parent(parent)
                .await
                .map_err(|e| TxAbort::new("delete_properties", e))?;
            delete_entity()
                .await
                .map_err(|e| TxAbort::new("delete_entity", e))
        });

        match ctx.run(transactor.in_transaction(work)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(tx)) => Err(WorldError::from_transaction(
                entity,
                Operation::Delete,
                parent.id(),
                tx,
                &["delete_entity"],
            )),
            Err(interrupted) => Err(WorldError::interrupted(entity, Operation::Delete, interrupted)),
        }
    }
}
