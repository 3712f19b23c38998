//! MushWorld Engine library.
//!
//! This crate contains the world service and the infrastructure it runs on.
//!
//! ## Structure
//!
//! - `use_cases/` - World service: access checks, validation, orchestration
//! - `infrastructure/` - Ports and their adapters (storage, access, events)
//! - `request_context` - Per-request cancellation and deadlines
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod request_context;
pub mod use_cases;

/// World seeding helpers for tests.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end scenarios against the in-memory world.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
