//! Character operations.

use mushworld_domain::validation::{normalize_character_name, validate_character_name};
use mushworld_domain::{Character, CharacterId, ListOptions, LocationId, MovePayload, PropertyParent};

use super::{Action, EntityKind, Operation, ResourceKind, WorldError, WorldResult, WorldService};
use crate::request_context::RequestContext;

const ENTITY: EntityKind = EntityKind::Character;

impl WorldService {
    /// Stores a new character with its name normalized to initial caps.
    pub async fn create_character(
        &self,
        ctx: &RequestContext,
        subject: &str,
        mut character: Character,
    ) -> WorldResult<Character> {
        let repo = self.characters(ENTITY, Operation::Create)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Character.wildcard(), ENTITY)
            .await?;

        let name = normalize_character_name(character.name());
        validate_character_name(&name).map_err(|e| WorldError::invalid(ENTITY, e))?;
        character.set_name(name);
        character
            .validate_fields()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        character.assign_id_if_nil();

        Self::stored(ctx, ENTITY, Operation::Create, character.id(), repo.create(&character)).await?;
        Ok(character)
    }

    pub async fn get_character(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: CharacterId,
    ) -> WorldResult<Character> {
        let repo = self.characters(ENTITY, Operation::Get)?;
        self.check_access(ctx, subject, Action::Read, &ResourceKind::Character.resource(id), ENTITY)
            .await?;
        Self::stored(ctx, ENTITY, Operation::Get, id, repo.get(id)).await
    }

    pub async fn update_character(
        &self,
        ctx: &RequestContext,
        subject: &str,
        character: &Character,
    ) -> WorldResult<()> {
        let repo = self.characters(ENTITY, Operation::Update)?;
        self.check_access(
            ctx,
            subject,
            Action::Write,
            &ResourceKind::Character.resource(character.id()),
            ENTITY,
        )
        .await?;
        character
            .validate()
            .map_err(|e| WorldError::invalid(ENTITY, e))?;
        Self::stored(ctx, ENTITY, Operation::Update, character.id(), repo.update(character)).await
    }

    /// Deletes the character and its properties atomically.
    pub async fn delete_character(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: CharacterId,
    ) -> WorldResult<()> {
        let repo = self.characters(ENTITY, Operation::Delete)?;
        self.cascade_delete(ctx, subject, ENTITY, PropertyParent::Character(id), move || repo.delete(id))
            .await
    }

    /// Characters present at a location, one page at a time.
    pub async fn get_characters_by_location(
        &self,
        ctx: &RequestContext,
        subject: &str,
        location_id: LocationId,
        options: ListOptions,
    ) -> WorldResult<Vec<Character>> {
        let repo = self.characters(ENTITY, Operation::Query)?;
        self.check_access(
            ctx,
            subject,
            Action::ListCharacters,
            &ResourceKind::Location.resource(location_id),
            ENTITY,
        )
        .await?;
        Self::stored(
            ctx,
            ENTITY,
            Operation::Query,
            location_id,
            repo.get_by_location(location_id, options),
        )
        .await
    }

    /// Places or moves a character and publishes a `move` event to the
    /// destination. A character with no current location is being placed
    /// for the first time.
    pub async fn move_character(
        &self,
        ctx: &RequestContext,
        subject: &str,
        id: CharacterId,
        to: LocationId,
    ) -> WorldResult<()> {
        let characters = self.characters(ENTITY, Operation::Move)?;
        let locations = self.locations(ENTITY, Operation::Move)?;
        self.require_publisher(ENTITY, Operation::Move)?;
        self.check_access(ctx, subject, Action::Write, &ResourceKind::Character.resource(id), ENTITY)
            .await?;

        let character = Self::stored(ctx, ENTITY, Operation::Move, id, characters.get(id)).await?;
        Self::lookup(ctx, EntityKind::Location, ENTITY, Operation::Move, to, locations.get(to)).await?;
        Self::stored(ctx, ENTITY, Operation::Move, id, characters.update_location(id, Some(to))).await?;

        let payload = MovePayload::character(id, character.location_id(), to);
        self.emitter
            .emit_move(ctx, &payload)
            .await
            .map_err(|e| {
                tracing::warn!(character_id = %id, code = e.code(), "character moved but move event failed");
                WorldError::event_failed(ENTITY, Operation::Move, e)
            })
    }
}
