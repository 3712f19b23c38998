//! Use cases - User story orchestration.
//!
//! The world service validates, authorizes and persists world changes and
//! announces them as events.

pub mod world;

pub use world::{
    Action, ErrorKind, ExitDeletion, WorldError, WorldResult, WorldService, WorldServiceConfig,
};
