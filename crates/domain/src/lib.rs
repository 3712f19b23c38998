//! MushWorld domain model.
//!
//! Pure types and invariants for the shared text world: identifiers,
//! validation primitives, entities, containment and event payloads. Nothing
//! here performs I/O.

extern crate self as mushworld_domain;

pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod validation;
pub mod value_objects;

pub use entities::{
    Character, EntityProperty, Exit, ExitLock, ExitVisibility, Location, LocationType, LockData,
    LockType, Object, ParentType, ParticipantRole, PropertyParent, PropertyVisibility,
    SceneParticipant,
};
pub use error::DomainError;
pub use events::{
    EntityType, EventType, ExaminePayload, ExamineTargetType, MovePayload, ObjectCreatePayload,
    ObjectGivePayload,
};
pub use ids::{CharacterId, EventId, ExitId, LocationId, ObjectId, PlayerId, PropertyId};
pub use value_objects::{Containment, ContainmentType, ListOptions, ReplayPolicy};
