//! Examine operations. The examine event is spectated at the examiner's
//! location, whatever the target.

use mushworld_domain::{CharacterId, ExaminePayload, ExamineTargetType, LocationId, ObjectId};
use uuid::Uuid;

use super::{Action, EntityKind, Operation, ResourceKind, WorldError, WorldResult, WorldService};
use crate::request_context::RequestContext;

const ENTITY: EntityKind = EntityKind::Examine;

/// A resolved examine target.
struct Target {
    kind: ExamineTargetType,
    id: Uuid,
    name: String,
    resource: String,
    operation: Operation,
}

impl WorldService {
    pub async fn examine_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        character_id: CharacterId,
        target_id: LocationId,
    ) -> WorldResult<()> {
        let locations = self.locations(ENTITY, Operation::Examine)?;
        let examiner_location = self.examiner_location(ctx, character_id).await?;
        let target = Self::lookup(
            ctx,
            EntityKind::Location,
            ENTITY,
            Operation::Examine,
            target_id,
            locations.get(target_id),
        )
        .await?;
        self.examine(
            ctx,
            subject,
            character_id,
            examiner_location,
            Target {
                kind: ExamineTargetType::Location,
                id: target_id.to_uuid(),
                name: target.name().to_string(),
                resource: ResourceKind::Location.resource(target_id),
                operation: Operation::ExamineLocation,
            },
        )
        .await
    }

    pub async fn examine_object(
        &self,
        ctx: &RequestContext,
        subject: &str,
        character_id: CharacterId,
        target_id: ObjectId,
    ) -> WorldResult<()> {
        let objects = self.objects(ENTITY, Operation::Examine)?;
        let examiner_location = self.examiner_location(ctx, character_id).await?;
        let target = Self::lookup(
            ctx,
            EntityKind::Object,
            ENTITY,
            Operation::Examine,
            target_id,
            objects.get(target_id),
        )
        .await?;
        self.examine(
            ctx,
            subject,
            character_id,
            examiner_location,
            Target {
                kind: ExamineTargetType::Object,
                id: target_id.to_uuid(),
                name: target.name().to_string(),
                resource: ResourceKind::Object.resource(target_id),
                operation: Operation::ExamineObject,
            },
        )
        .await
    }

    pub async fn examine_character(
        &self,
        ctx: &RequestContext,
        subject: &str,
        character_id: CharacterId,
        target_id: CharacterId,
    ) -> WorldResult<()> {
        let characters = self.characters(ENTITY, Operation::Examine)?;
        let examiner_location = self.examiner_location(ctx, character_id).await?;
        let target = Self::lookup(
            ctx,
            EntityKind::Character,
            ENTITY,
            Operation::Examine,
            target_id,
            characters.get(target_id),
        )
        .await?;
        self.examine(
            ctx,
            subject,
            character_id,
            examiner_location,
            Target {
                kind: ExamineTargetType::Character,
                id: target_id.to_uuid(),
                name: target.name().to_string(),
                resource: ResourceKind::Character.resource(target_id),
                operation: Operation::ExamineCharacter,
            },
        )
        .await
    }

    /// Where the examiner stands. Characters outside the world cannot
    /// examine anything.
    async fn examiner_location(
        &self,
        ctx: &RequestContext,
        character_id: CharacterId,
    ) -> WorldResult<LocationId> {
        let characters = self.characters(ENTITY, Operation::Examine)?;
        self.require_publisher(ENTITY, Operation::Examine)?;
        let examiner = Self::lookup(
            ctx,
            EntityKind::Character,
            ENTITY,
            Operation::Examine,
            character_id,
            characters.get(character_id),
        )
        .await?;
        examiner.location_id().ok_or_else(|| {
            WorldError::precondition(
                ENTITY,
                Operation::Examine,
                format!("character {} not in world", character_id),
            )
        })
    }

    async fn examine(
        &self,
        ctx: &RequestContext,
        subject: &str,
        character_id: CharacterId,
        location_id: LocationId,
        target: Target,
    ) -> WorldResult<()> {
        self.check_access(ctx, subject, Action::Read, &target.resource, ENTITY)
            .await?;

        let payload = ExaminePayload {
            character_id,
            target_type: target.kind,
            target_id: target.id,
            target_name: target.name,
            location_id,
        };
        self.emitter
            .emit_examine(ctx, &payload)
            .await
            .map_err(|e| WorldError::event_failed(ENTITY, target.operation, e))
    }
}
