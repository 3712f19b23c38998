//! Location operations.

use mushworld_domain::{Location, LocationId, LocationType, PropertyParent, ReplayPolicy};

use super::{Action, EntityKind, Operation, ResourceKind, WorldError, WorldResult, WorldService};
use crate::request_context::RequestContext;

const ENTITY: EntityKind = EntityKind::Location;

impl WorldService {
    pub async fn get_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: LocationId,
    ) -> WorldResult<Location> {
        let repo = self.locations(ENTITY, Operation::Get)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Location.resource(id), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::Get, id, repo.get(id)).await
    }

    /// Stores a new location. A nil id is replaced with a fresh one after
    /// validation; the stored location is returned.
    pub async fn create_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        mut location: Location,
    ) -> WorldResult<Location> {
        let repo = self.locations(ENTITY, Operation::Create)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Location.wildcard(), ENTITY)
            .await?;
        location
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        location.assign_id_if_nil();
        Self::stored(ctx, ENTITY, Operation::Create, location.id(), repo.create(&location)).await?;
        Ok(location)
    }

    pub async fn update_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        location: &Location,
    ) -> WorldResult<()> {
        let repo = self.locations(ENTITY, Operation::Update)?;
        self.check_access(
            ctx,
            subject,
            Action::Write,
            &ResourceKind::Location.resource(location.id()),
            ENTITY,
        )
        .await?;
        location
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        Self::stored(ctx, ENTITY, Operation::Update, location.id(), repo.update(location)).await
    }

    /// Deletes the location and its properties atomically.
    pub async fn delete_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: LocationId,
    ) -> WorldResult<()> {
        let repo = self.locations(ENTITY, Operation::Delete)?;
        self.cascade_delete(ctx, subject, ENTITY, PropertyParent::Location(id), move || repo.delete(id))
            .await
    }

    pub async fn find_location_by_name(
        &self,
        ctx: &RequestContext,
        subject: &str,
        name: &str,
    ) -> WorldResult<Location> {
        let repo = self.locations(ENTITY, Operation::Find)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Location.wildcard(), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::Find, name, repo.find_by_name(name)).await
    }

    pub async fn list_locations_by_type(
        &self,
        ctx: &RequestContext,
        subject: &str,
        location_type: LocationType,
    ) -> WorldResult<Vec<Location>> {
        let repo = self.locations(ENTITY, Operation::List)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Location.wildcard(), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::List, location_type, repo.list_by_type(location_type))
            .await
    }

    /// Scenes that shadow `id`.
    pub async fn get_shadowed_by(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: LocationId,
    ) -> WorldResult<Vec<Location>> {
        let repo = self.locations(ENTITY, Operation::List)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Location.resource(id), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::List, id, repo.get_shadowed_by(id)).await
    }

    /// Events replayed to a new observer of the location's stream.
    ///
    /// A malformed stored policy replays nothing and is logged.
    pub async fn replay_limit(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: LocationId,
    ) -> WorldResult<ReplayPolicy> {
        let location = self.get_location(ctx, subject, id).await?;
        match location.replay_policy().parse::<ReplayPolicy>() {
            Ok(policy) => Ok(policy),
            Err(e) => {
                tracing::warn!(
                    location_id = %id,
                    policy = location.replay_policy(),
                    error = %e,
                    "malformed replay policy, replaying nothing"
                );
                Ok(ReplayPolicy::NONE)
            }
        }
    }
}
