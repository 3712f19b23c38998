//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - World storage (one repository per entity kind)
//! - Access decisions (opaque evaluator)
//! - Transaction scoping
//! - Event publishing and the durable event log
//! - Clock (for testing)

mod access;
mod error;
mod events;
mod repos;
mod testing;
mod transaction;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// Access, Events, Transactions
// =============================================================================
pub use access::{AccessEvaluator, AccessRequest, Decision, Effect, InvalidAccessRequest};
pub use events::{EventAppender, EventPublisher, StoredEvent};
pub use transaction::{tx_work, Transactor, TxFuture, TxWork};

#[cfg(test)]
pub use access::MockAccessEvaluator;
#[cfg(test)]
pub use events::{MockEventAppender, MockEventPublisher};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{AccessError, AppendError, PublishError, RepoError, TxAbort, TxError};

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::ClockPort;

#[cfg(test)]
pub use testing::MockClockPort;
