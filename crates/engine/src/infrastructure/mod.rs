//! Infrastructure implementations.
//!
//! Contains port trait implementations for storage, access decisions and
//! event delivery, plus the emitter and settings.

pub mod clock;
pub mod emitter;
pub mod event_store;
pub mod grants;
pub mod memory;
pub mod ports;
pub mod settings;
