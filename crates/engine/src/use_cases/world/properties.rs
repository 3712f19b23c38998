//! Entity property operations.

use mushworld_domain::{EntityProperty, PropertyId, PropertyParent};

use super::{Action, EntityKind, Operation, ResourceKind, WorldError, WorldResult, WorldService};
use crate::request_context::RequestContext;

const ENTITY: EntityKind = EntityKind::Property;

impl WorldService {
    /// Stores a new property. Restricted properties without an explicit
    /// audience default to their owner.
    pub async fn create_property(
        &self,
        ctx: &RequestContext,
        subject: &str,
        mut property: EntityProperty,
    ) -> WorldResult<EntityProperty> {
        let repo = self.properties(ENTITY, Operation::Create)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Property.wildcard(), ENTITY)
            .await?;
        property.apply_visibility_defaults();
        property
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        property.assign_id_if_nil();
        Self::stored(ctx, ENTITY, Operation::Create, property.id(), repo.create(&property)).await?;
        Ok(property)
    }

    pub async fn get_property(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: PropertyId,
    ) -> WorldResult<EntityProperty> {
        let repo = self.properties(ENTITY, Operation::Get)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Property.resource(id), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::Get, id, repo.get(id)).await
    }

    /// Stores changes to a property and returns it with a fresh `updated_at`.
    pub async fn update_property(
        &self,
        ctx: &RequestContext,
        subject: &str,
        mut property: EntityProperty,
    ) -> WorldResult<EntityProperty> {
        let repo = self.properties(ENTITY, Operation::Update)?;
        self.check_access(
            ctx,
            subject,
            Action::Write,
            &ResourceKind::Property.resource(property.id()),
            ENTITY,
        )
        .await?;
        property.apply_visibility_defaults();
        property
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        property.touch(self.clock.now());
        Self::stored(ctx, ENTITY, Operation::Update, property.id(), repo.update(&property)).await?;
        Ok(property)
    }

    pub async fn delete_property(&self, ctx: &RequestContext, subject: &str, id: PropertyId) -> WorldResult<()> {
        let repo = self.properties(ENTITY, Operation::Delete)?;
        self.check_access(ctx, subject, Action::Delete, &ResourceKind::Property.resource(id), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::Delete, id, repo.delete(id)).await
    }

    /// Properties attached to `parent`, checked as a read of the parent.
    pub async fn list_properties(
        &self,
        ctx: &RequestContext,
        subject: &str,
        parent: PropertyParent,
    ) -> WorldResult<Vec<EntityProperty>> {
        let repo = self.properties(ENTITY, Operation::List)?;
        let resource = ResourceKind::from(parent).resource(parent.id());
        self.check_access(ctx, subject, Action::Read, &resource, ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::List, parent, repo.list_by_parent(parent)).await
    }
}
