//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    event_store::{EventStorePublisher, InMemoryEventLog},
    grants::GrantEvaluator,
    memory::{InMemoryRepositories, InMemoryWorld},
    ports::{ClockPort, EventAppender},
    settings::WorldSettings,
};
use crate::use_cases::{WorldService, WorldServiceConfig};

/// Main application state.
///
/// Owns the shared world tables, the grant table the service checks against,
/// the event log the service publishes into, and the service itself.
pub struct App {
    pub settings: WorldSettings,
    pub world: InMemoryWorld,
    pub repositories: InMemoryRepositories,
    pub grants: Arc<GrantEvaluator>,
    pub event_log: Arc<InMemoryEventLog>,
    pub world_service: WorldService,
}

impl App {
    /// In-memory application on the system clock.
    pub fn in_memory(settings: WorldSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a new App with all dependencies wired up.
    pub fn with_clock(settings: WorldSettings, clock: Arc<dyn ClockPort>) -> Self {
        let world = InMemoryWorld::with_max_nesting_depth(settings.max_nesting_depth);
        let repositories = InMemoryRepositories::new(world.clone());
        let grants = Arc::new(GrantEvaluator::new());
        let event_log = Arc::new(InMemoryEventLog::new());

        let appender: Arc<dyn EventAppender> = event_log.clone();
        let publisher = Arc::new(EventStorePublisher::new(appender, clock.clone()));

        let config = WorldServiceConfig::new(grants.clone(), clock)
            .with_locations(repositories.location.clone())
            .with_exits(repositories.exit.clone())
            .with_objects(repositories.object.clone())
            .with_characters(repositories.character.clone())
            .with_scenes(repositories.scene.clone())
            .with_properties(repositories.property.clone())
            .with_transactor(repositories.transactor.clone())
            .with_publisher(publisher)
            .with_publisher_mode(settings.publisher_mode)
            .with_retry(settings.retry.clone());

        tracing::debug!(
            max_nesting_depth = settings.max_nesting_depth,
            publisher_mode = ?settings.publisher_mode,
            max_retries = settings.retry.max_retries,
            "world service wired"
        );

        Self {
            settings,
            world,
            repositories,
            grants,
            event_log,
            world_service: WorldService::new(config),
        }
    }
}
