//! Scene participant operations. Scenes are locations of type scene.

use mushworld_domain::{CharacterId, Location, LocationId, ParticipantRole, SceneParticipant};

use super::{Action, EntityKind, Operation, ResourceKind, WorldError, WorldResult, WorldService};
use crate::request_context::RequestContext;

const ENTITY: EntityKind = EntityKind::Scene;

impl WorldService {
    /// Adds `character_id` to a scene. `role` is checked against the known
    /// participant roles after access is granted.
    pub async fn add_scene_participant(
        &self,
        ctx: &RequestContext,
        subject: &str,
        scene_id: LocationId,
        character_id: CharacterId,
        role: &str,
    ) -> WorldResult<()> {
        let repo = self.scenes(ENTITY, Operation::AddParticipant)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Scene.resource(scene_id), ENTITY)
            .await?;
        let role: ParticipantRole = role.parse().map_err(|e| WorldError::invalid(ENTITY, e))?;
        Self::stored(
            ctx,
            ENTITY,
            Operation::AddParticipant,
            scene_id,
            repo.add_participant(scene_id, character_id, role),
        )
        .await
    }

    pub async fn remove_scene_participant(
        &self,
        ctx: &RequestContext,
        subject: &str,
        scene_id: LocationId,
        character_id: CharacterId,
    ) -> WorldResult<()> {
        let repo = self.scenes(ENTITY, Operation::RemoveParticipant)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Scene.resource(scene_id), ENTITY)
            .await?;
        Self::stored(
            ctx,
            ENTITY,
            Operation::RemoveParticipant,
            scene_id,
            repo.remove_participant(scene_id, character_id),
        )
        .await
    }

    pub async fn list_scene_participants(
        &self,
        ctx: &RequestContext,
        subject: &str,
        scene_id: LocationId,
    ) -> WorldResult<Vec<SceneParticipant>> {
        let repo = self.scenes(ENTITY, Operation::ListParticipants)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Scene.resource(scene_id), ENTITY)
            .await?;
        Self::stored(
            ctx,
            ENTITY,
            Operation::ListParticipants,
            scene_id,
            repo.list_participants(scene_id),
        )
        .await
    }

    /// Scenes `character_id` participates in.
    pub async fn list_scenes_for(
        &self,
        ctx: &RequestContext,
        subject: &str,
        character_id: CharacterId,
    ) -> WorldResult<Vec<Location>> {
        let repo = self.scenes(ENTITY, Operation::List)?;
        self.check_access(
            ctx,
            subject,
            Action::Read,
            &ResourceKind::Character.resource(character_id),
            ENTITY,
        )
        .await?;
        Self::stored(ctx, ENTITY, Operation::List, character_id, repo.get_scenes_for(character_id))
            .await
    }
}
