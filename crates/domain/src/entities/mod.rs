//! World entities.

mod character;
mod exit;
mod location;
mod object;
mod property;
mod scene;

pub use character::Character;
pub use exit::{Exit, ExitLock, ExitVisibility, LockData, LockType};
pub use location::{Location, LocationType};
pub use object::Object;
pub use property::{EntityProperty, ParentType, PropertyParent, PropertyVisibility};
pub use scene::{ParticipantRole, SceneParticipant};
