//! Object operations: placement, movement and giving.

use mushworld_domain::{
    CharacterId, Containment, DomainError, LocationId, MovePayload, Object, ObjectCreatePayload,
    ObjectGivePayload, ObjectId, PropertyParent,
};

use super::{Action, EntityKind, Operation, ResourceKind, WorldError, WorldResult, WorldService};
use crate::request_context::RequestContext;

const ENTITY: EntityKind = EntityKind::Object;

impl WorldService {
    pub async fn get_object(&self, ctx: &RequestContext, subject: &str, id: ObjectId) -> WorldResult<Object> {
        let repo = self.objects(ENTITY, Operation::Get)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Object.resource(id), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::Get, id, repo.get(id)).await
    }

    /// Stores a new object, then announces it. The announcement is best
    /// effort: a failure is logged and the created object still returned.
    pub async fn create_object(
        &self,
        ctx: &RequestContext,
        subject: &str,
        mut object: Object,
    ) -> WorldResult<Object> {
        let repo = self.objects(ENTITY, Operation::Create)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Object.wildcard(), ENTITY)
            .await?;
        object
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        object.assign_id_if_nil();
        Self::stored(ctx, ENTITY, Operation::Create, object.id(), repo.create(&object)).await?;

        let payload = ObjectCreatePayload::new(
            object.id(),
            object.name(),
            object.containment().location_id,
        );
        if let Err(e) = self.emitter.emit_object_create(ctx, &payload).await {
            tracing::warn!(
                object_id = %object.id(),
                code = e.code(),
                error = %e,
                "object created but creation event was not published"
            );
        }
        Ok(object)
    }

    pub async fn update_object(&self, ctx: &RequestContext, subject: &str, object: &Object) -> WorldResult<()> {
        let repo = self.objects(ENTITY, Operation::Update)?;
        self.check_access(
            ctx,
            subject,
            Action::Write,
            &ResourceKind::Object.resource(object.id()),
            ENTITY,
        )
        .await?;
        object
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        Self::stored(ctx, ENTITY, Operation::Update, object.id(), repo.update(object)).await
    }

    /// Deletes the object and its properties atomically.
    pub async fn delete_object(&self, ctx: &RequestContext, subject: &str, id: ObjectId) -> WorldResult<()> {
        let repo = self.objects(ENTITY, Operation::Delete)?;
        self.cascade_delete(ctx, subject, ENTITY, PropertyParent::Object(id), move || repo.delete(id))
            .await
    }

    /// Moves an object and publishes a `move` event to the destination.
    ///
    /// When publishing fails after the move is stored, the error reports
    /// `change_committed()` and the move must not be retried.
    pub async fn move_object(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: ObjectId,
        to: Containment,
    ) -> WorldResult<()> {
        let repo = self.objects(ENTITY, Operation::Move)?;
        self.require_publisher(ENTITY, Operation::Move)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Object.resource(id), ENTITY)
            .await?;
        to.validate().map_err(|e| WorldError::invalid(ENTITY, e))?;

        let from = Self::stored(ctx, ENTITY, Operation::Move, id, repo.get(id))
            .await?
            .containment();
        Self::stored(ctx, ENTITY, Operation::Move, id, repo.move_object(id, to)).await?;

        let payload = MovePayload::object(id, from, to);
        self.emitter
            .emit_move(ctx, &payload)
            .await
            .map_err(|e| {
                tracing::warn!(object_id = %id, code = e.code(), "object moved but move event failed");
                WorldError::event_failed(ENTITY, Operation::Move, e)
            })
    }

    /// Hands an object from one character to another and notifies the
    /// recipient.
    pub async fn give_object(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: ObjectId,
        from: CharacterId,
        to: CharacterId,
    ) -> WorldResult<()> {
        let objects = self.objects(ENTITY, Operation::Give)?;
        let characters = self.characters(ENTITY, Operation::Give)?;
        self.require_publisher(ENTITY, Operation::Give)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Object.resource(id), ENTITY)
            .await?;
        if from == to {
            return Err(WorldError::invalid(
                ENTITY,
                DomainError::validation("to_character_id", "cannot give object to self"),
            ));
        }

        let object = Self::stored(ctx, ENTITY, Operation::Give, id, objects.get(id)).await?;
        if !object.is_held_by(from) {
            return Err(WorldError::precondition(
                ENTITY,
                Operation::Give,
                format!("object {} is not held by character {}", id, from),
            ));
        }
        Self::lookup(ctx, EntityKind::Character, ENTITY, Operation::Give, to, characters.get(to))
            .await?;
        Self::stored(ctx, ENTITY, Operation::Give, id, objects.move_object(id, Containment::held_by(to)))
            .await?;

        let payload = ObjectGivePayload {
            object_id: id,
            object_name: object.name().to_string(),
            from_character_id: from,
            to_character_id: to,
        };
        self.emitter
            .emit_object_give(ctx, &payload)
            .await
            .map_err(|e| {
                tracing::warn!(object_id = %id, code = e.code(), "object given but give event failed");
                WorldError::event_failed(ENTITY, Operation::Give, e)
            })
    }

    pub async fn list_objects_at_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        location_id: LocationId,
    ) -> WorldResult<Vec<Object>> {
        let repo = self.objects(ENTITY, Operation::List)?;
        self.check_access(
            ctx,
            subject,
            Action::Read,
            &ResourceKind::Location.resource(location_id),
            ENTITY,
        )
        .await?;
        Self::stored(ctx, ENTITY, Operation::List, location_id, repo.list_at_location(location_id))
            .await
    }

    pub async fn list_objects_held_by(
        &self,
        ctx: &RequestContext,
        subject: &str,
        character_id: CharacterId,
    ) -> WorldResult<Vec<Object>> {
        let repo = self.objects(ENTITY, Operation::List)?;
        self.check_access(
            ctx,
            subject,
            Action::Read,
            &ResourceKind::Character.resource(character_id),
            ENTITY,
        )
        .await?;
        Self::stored(ctx, ENTITY, Operation::List, character_id, repo.list_held_by(character_id))
            .await
    }

    pub async fn list_objects_contained_in(
        &self,
        ctx: &RequestContext,
        subject: &str,
        container_id: ObjectId,
    ) -> WorldResult<Vec<Object>> {
        let repo = self.objects(ENTITY, Operation::List)?;
        self.check_access(
            ctx,
            subject,
            Action::Read,
            &ResourceKind::Object.resource(container_id),
            ENTITY,
        )
        .await?;
        Self::stored(ctx, ENTITY, Operation::List, container_id, repo.list_contained_in(container_id))
            .await
    }
}
