//! Value objects shared across entities and payloads.

mod containment;
mod list_options;
mod replay_policy;

pub use containment::{Containment, ContainmentType};
pub use list_options::{ListOptions, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use replay_policy::{default_replay_policy, parse_replay_policy, ReplayPolicy};
